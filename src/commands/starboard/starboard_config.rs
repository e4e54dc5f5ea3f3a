use poise::CreateReply;
use serenity::{
    builder::{CreateEmbed, CreateEmbedFooter},
    model::{
        Colour,
        channel::{GuildChannel, ReactionType},
        id::{GuildId, MessageId, UserId}
    }
};
use tracing::{debug, error};

use crate::{dozerboard, DozerContext, Error};
use super::starboard_engine::{RepostOutcome, StarboardError};
use super::starboard_messenger::{is_not_found, DiscordMessenger};
use super::starboard_models::GuildStarboardConfig;

fn config_embed(prefix: &str, title: impl Into<String>, config: &GuildStarboardConfig) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .colour(Colour::GOLD)
        .field("Channel", format!("<#{}>", config.channel_id), true)
        .field("Emoji", &config.emoji, true)
        .field("Threshold", config.threshold.to_string(), true)
        .footer(CreateEmbedFooter::new(format!("For more information, try {prefix}help starboard")))
}

fn guild_name(ctx: &DozerContext<'_>, guild_id: GuildId) -> String {
    guild_id.name(ctx.serenity_context()).unwrap_or_else(|| guild_id.to_string())
}

// Slash commands have no message to test-react on, so unicode input is only checked for non-ASCII content.
fn looks_like_unicode_emoji(text: &str) -> bool {
    !text.is_empty() && text.chars().any(|c| !c.is_ascii())
}

async fn emoji_usable(ctx: DozerContext<'_>, guild_id: GuildId, emoji: &ReactionType) -> bool {
    match ctx {
        poise::Context::Prefix(prefix) => {
            match prefix.msg.react(ctx.serenity_context(), emoji.clone()).await {
                Ok(reaction) => {
                    if let Err(ex) = reaction.delete(ctx.serenity_context()).await {
                        debug!("Failed to remove test reaction: {}", ex);
                    }
                    true
                }
                Err(_) => false
            }
        }
        poise::Context::Application(_) => match emoji {
            ReactionType::Custom { id, .. } => guild_id.emoji(ctx.http(), *id).await.is_ok(),
            ReactionType::Unicode(text) => looks_like_unicode_emoji(text),
            _ => false
        }
    }
}

fn parse_message_id(text: &str) -> Option<MessageId> {
    text.trim().parse::<u64>().ok().filter(|id| *id != 0).map(MessageId::new)
}

pub async fn info_code(ctx: DozerContext<'_>) -> Result<(), Error> {
    let starboard = dozerboard!(ctx);

    if let Some(guild_id) = ctx.guild_id() {
        match starboard.get_config(guild_id).await {
            Ok(Some(config)) => {
                let title = format!("Starboard configuration for {}", guild_name(&ctx, guild_id));
                ctx.send(CreateReply::default().embed(config_embed(ctx.prefix(), title, &config))).await?;
            }
            Ok(None) => {
                ctx.say(format!("This server does not have a starboard configured! See `{}help starboard` for more information.", ctx.prefix())).await?;
            }
            Err(ex) => {
                ctx.say("Failed to fetch starboard settings for this server...").await?;
                error!("Failed to get starboard config: {}", ex);
            }
        }
    } else {
        ctx.say("This command can only be run in a server.").await?;
    }

    Ok(())
}

#[poise::command(
    prefix_command,
    slash_command,
    description_localized("en-US", "Get the current settings for the starboard."),
    guild_only,
    required_bot_permissions = "EMBED_LINKS"
)]
pub async fn info(ctx: DozerContext<'_>) -> Result<(), Error> {
    info_code(ctx).await
}

/// Change the current starboard settings for the server.
///
/// `starboard config #hall-of-fame 🌟 5` - repost messages that get 5 star reactions to `#hall-of-fame`.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Set the starboard channel, emoji and reaction threshold."),
    required_permissions = "MANAGE_GUILD | MANAGE_CHANNELS",
    required_bot_permissions = "ADD_REACTIONS | EMBED_LINKS"
)]
pub async fn config(
    ctx: DozerContext<'_>,
    #[description = "The channel to repost starred messages in."] channel: GuildChannel,
    #[description = "An emote on the server or a default Discord emoji."] emoji: ReactionType,
    #[description = "How many reactions a message needs to be reposted."] #[min = 1] threshold: u64)
-> Result<(), Error> {
    let starboard = dozerboard!(ctx);

    let guild_id = match ctx.guild_id() {
        Some(guild_id) => guild_id,
        None => {
            ctx.say("This command can only be run in a server.").await?;
            return Ok(());
        }
    };

    if threshold == 0 {
        ctx.say("The threshold must be a positive number.").await?;
        return Ok(());
    }

    if channel.guild_id != guild_id {
        ctx.say("Could not find channel in this server!").await?;
        return Ok(());
    }

    if !emoji_usable(ctx, guild_id, &emoji).await {
        ctx.say(format!("<@{}>, bad argument: '{}' is not an emoji!", ctx.author().id, emoji)).await?;
        return Ok(());
    }

    let config = GuildStarboardConfig {
        guild_id,
        channel_id: channel.id,
        emoji: emoji.to_string(),
        threshold
    };

    if let Err(ex) = starboard.set_config(&config).await {
        ctx.say("We couldn't update the starboard, sorry... Try again later?").await?;
        error!("Failed to update starboard config: {}", ex);
    } else {
        let title = format!("Updated configuration for {}!", guild_name(&ctx, guild_id));
        ctx.send(CreateReply::default().embed(config_embed(ctx.prefix(), title, &config))).await?;
    }

    Ok(())
}

/// Manually add a message to the starboard.
///
/// The caller must have permission to send messages in the starboard channel.
/// `starboard add #channel 1285719825125` - add message `1285719825125` in `#channel` to the starboard.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    description_localized("en-US", "Manually add a message to the starboard."),
    required_bot_permissions = "EMBED_LINKS"
)]
pub async fn add(
    ctx: DozerContext<'_>,
    #[description = "The channel the message was sent in."] channel: GuildChannel,
    #[description = "The ID of the message to add."] message_id: String)
-> Result<(), Error> {
    let starboard = dozerboard!(ctx);

    let guild_id = match ctx.guild_id() {
        Some(guild_id) => guild_id,
        None => {
            ctx.say("This command can only be run in a server.").await?;
            return Ok(());
        }
    };

    let message_id = match parse_message_id(&message_id) {
        Some(message_id) => message_id,
        None => {
            ctx.say(format!("'{}' is not a message ID!", message_id)).await?;
            return Ok(());
        }
    };

    let config = match starboard.get_config(guild_id).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            ctx.say("This server does not have a starboard configured!").await?;
            return Ok(());
        }
        Err(ex) => {
            ctx.say("We couldn't get the starboard settings... try again later?").await?;
            error!("Failed to get starboard config: {}", ex);
            return Ok(());
        }
    };

    let starboard_channel = match config.channel_id.to_channel(ctx.serenity_context()).await {
        Ok(channel) => channel.guild(),
        Err(ex) if is_not_found(&ex) => None,
        Err(ex) => {
            ctx.say("We couldn't reach the starboard channel... try again later?").await?;
            error!("Failed to resolve starboard channel {}: {}", config.channel_id, ex);
            return Ok(());
        }
    };
    let starboard_channel = match starboard_channel {
        Some(starboard_channel) => starboard_channel,
        None => {
            ctx.say("The starboard channel no longer exists!").await?;
            return Ok(());
        }
    };

    let can_send = |user_id: UserId| starboard_channel
        .permissions_for_user(ctx.serenity_context(), user_id)
        .map(|p| p.send_messages())
        .unwrap_or(false);

    if !can_send(ctx.author().id) {
        ctx.say("You don't have permissions to add messages to the starboard channel!").await?;
        return Ok(());
    }

    let bot_id = ctx.serenity_context().cache.current_user().id;
    if !can_send(bot_id) {
        ctx.say("I don't have permissions to add messages to the starboard channel!").await?;
        return Ok(());
    }

    if channel.guild_id != guild_id {
        ctx.say(format!("Message ID {} was not found in <#{}>!", message_id, channel.id)).await?;
        return Ok(());
    }

    let messenger = DiscordMessenger::new(ctx.serenity_context());
    match starboard.manual_add(&messenger, &config, channel.id, message_id).await {
        Ok(RepostOutcome::ChannelMissing) => {
            ctx.say("The starboard channel no longer exists!").await?;
        }
        Ok(_) => {
            ctx.say(format!("Successfully posted message {} to the starboard!", message_id)).await?;
        }
        Err(StarboardError::SourceNotFound(_)) => {
            ctx.say(format!("Message ID {} was not found in <#{}>!", message_id, channel.id)).await?;
        }
        Err(ex) => {
            ctx.say("We couldn't post that message to the starboard, sorry... Try again later?").await?;
            error!("Failed to manually add message to starboard: {}", ex);
        }
    }

    Ok(())
}
