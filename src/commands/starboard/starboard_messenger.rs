use std::sync::Arc;
use async_trait::async_trait;
use serenity::{
    builder::{CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage},
    cache::Cache,
    client::Context,
    http::Http,
    model::{
        channel::ReactionType,
        id::{ChannelId, GuildId, MessageId, UserId}
    },
    Error as SerenityError
};
use tracing::debug;

use crate::Error;
use super::starboard_embed::RepostEmbed;
use super::starboard_engine::{FooterEdit, StarboardMessenger};
use super::starboard_models::SourceMessage;

/// Talks to Discord on behalf of the starboard engine.
pub struct DiscordMessenger {
    http: Arc<Http>,
    cache: Arc<Cache>
}

impl DiscordMessenger {
    pub fn new(ctx: &Context) -> Self {
        DiscordMessenger {
            http: ctx.http.clone(),
            cache: ctx.cache.clone()
        }
    }

    pub fn guild_name(&self, guild_id: GuildId) -> String {
        guild_id.name(&self.cache).unwrap_or_else(|| guild_id.to_string())
    }
}

/// Discord answered 404 (unknown channel or message). Anything else is a real failure.
pub fn is_not_found(ex: &SerenityError) -> bool {
    match ex {
        SerenityError::Http(http) => http.status_code().map(|status| status.as_u16()) == Some(404),
        _ => false
    }
}

#[async_trait]
impl StarboardMessenger for DiscordMessenger {
    fn current_user_id(&self) -> UserId {
        self.cache.current_user().id
    }

    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool, Error> {
        match channel_id.to_channel((&self.cache, self.http.as_ref())).await {
            Ok(_) => Ok(true),
            Err(ex) if is_not_found(&ex) => {
                debug!("Channel {} is gone: {}", channel_id, ex);
                Ok(false)
            }
            Err(ex) => Err(ex.into())
        }
    }

    async fn fetch_source_message(&self, guild_id: GuildId, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, Error> {
        match channel_id.message(self.http.as_ref(), message_id).await {
            Ok(msg) => Ok(Some(SourceMessage::from_message(&msg, guild_id, self.guild_name(guild_id)))),
            Err(ex) if is_not_found(&ex) => {
                debug!("Message {} in {} is gone: {}", message_id, channel_id, ex);
                Ok(None)
            }
            Err(ex) => Err(ex.into())
        }
    }

    async fn send_repost(&self, channel_id: ChannelId, embed: &RepostEmbed) -> Result<MessageId, Error> {
        let message = channel_id.send_message(self.http.as_ref(), CreateMessage::new().embed(embed.to_builder())).await?;
        Ok(message.id)
    }

    async fn edit_repost_footer(&self, channel_id: ChannelId, message_id: MessageId, footer: &str) -> Result<FooterEdit, Error> {
        let repost = match channel_id.message(self.http.as_ref(), message_id).await {
            Ok(repost) => repost,
            Err(ex) => {
                debug!("Could not fetch repost {}: {}", message_id, ex);
                return Ok(FooterEdit::RepostMissing);
            }
        };

        let embed = match repost.embeds.into_iter().next() {
            Some(embed) => CreateEmbed::from(embed).footer(CreateEmbedFooter::new(footer)),
            None => return Ok(FooterEdit::RepostMissing)
        };

        channel_id.edit_message(self.http.as_ref(), message_id, EditMessage::new().embed(embed)).await?;
        Ok(FooterEdit::Edited)
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), Error> {
        channel_id.delete_message(&self.http, message_id).await?;
        Ok(())
    }

    async fn add_reaction(&self, channel_id: ChannelId, message_id: MessageId, emoji: &str) -> Result<(), Error> {
        let reaction = ReactionType::try_from(emoji)?;
        self.http.create_reaction(channel_id, message_id, &reaction).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_404_counts_as_not_found() {
        assert!(!is_not_found(&SerenityError::Other("gateway closed")));
        assert!(!is_not_found(&SerenityError::Url("not a url".to_string())));
    }
}
