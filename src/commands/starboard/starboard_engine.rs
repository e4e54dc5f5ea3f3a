use std::sync::Arc;
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Error;
use super::starboard_cache::{ConfigCache, MessageLocks};
use super::starboard_embed::{footer_text, RepostEmbed};
use super::starboard_models::*;

/// Persistence for starboard configs and starred messages.
#[async_trait]
pub trait StarboardStore: Send + Sync {
    async fn get_starboard_config(&self, guild_id: GuildId) -> Result<Option<GuildStarboardConfig>, Error>;

    /// Deletes any existing row for the guild and inserts the new one in a single transaction.
    async fn replace_starboard_config(&self, config: &GuildStarboardConfig) -> Result<(), Error>;

    async fn get_starred_message(&self, source_message_id: MessageId) -> Result<Option<StarredMessageRecord>, Error>;

    /// Inserts the record unless one already exists for its source message, in which case the existing record is returned.
    async fn insert_starred_message(&self, record: &StarredMessageRecord) -> Result<InsertOutcome, Error>;

    async fn update_reaction_count(&self, source_message_id: MessageId, reaction_count: u64) -> Result<(), Error>;
}

#[async_trait]
impl<T: StarboardStore + ?Sized> StarboardStore for Arc<T> {
    async fn get_starboard_config(&self, guild_id: GuildId) -> Result<Option<GuildStarboardConfig>, Error> {
        (**self).get_starboard_config(guild_id).await
    }

    async fn replace_starboard_config(&self, config: &GuildStarboardConfig) -> Result<(), Error> {
        (**self).replace_starboard_config(config).await
    }

    async fn get_starred_message(&self, source_message_id: MessageId) -> Result<Option<StarredMessageRecord>, Error> {
        (**self).get_starred_message(source_message_id).await
    }

    async fn insert_starred_message(&self, record: &StarredMessageRecord) -> Result<InsertOutcome, Error> {
        (**self).insert_starred_message(record).await
    }

    async fn update_reaction_count(&self, source_message_id: MessageId, reaction_count: u64) -> Result<(), Error> {
        (**self).update_reaction_count(source_message_id, reaction_count).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterEdit {
    Edited,
    /// The repost could not be fetched (usually deleted), so nothing was edited.
    RepostMissing
}

/// The chat platform as seen by the starboard. Every call may fail.
#[async_trait]
pub trait StarboardMessenger: Send + Sync {
    fn current_user_id(&self) -> UserId;

    /// `Ok(false)` only when the channel is known to be gone.
    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool, Error>;

    /// `Ok(None)` only when the message (or its channel) is known to be gone.
    async fn fetch_source_message(&self, guild_id: GuildId, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, Error>;

    async fn send_repost(&self, channel_id: ChannelId, embed: &RepostEmbed) -> Result<MessageId, Error>;

    async fn edit_repost_footer(&self, channel_id: ChannelId, message_id: MessageId, footer: &str) -> Result<FooterEdit, Error>;

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), Error>;

    async fn add_reaction(&self, channel_id: ChannelId, message_id: MessageId, emoji: &str) -> Result<(), Error>;
}

#[derive(Debug, Error)]
pub enum StarboardError {
    #[error("starboard storage failed: {0}")]
    Storage(#[source] Error),
    #[error("starboard messaging failed: {0}")]
    Messaging(#[source] Error),
    #[error("message {0} was not found")]
    SourceNotFound(MessageId)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepostOutcome {
    Posted { repost_message_id: MessageId },
    Updated { repost_message_id: MessageId },
    /// The count was stored but the repost itself could not be fetched for editing.
    UpdatedWithoutEdit { repost_message_id: MessageId },
    /// The configured starboard channel no longer exists.
    ChannelMissing
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    NotConfigured,
    BelowThreshold,
    WrongEmoji,
    FromSelf,
    Reposted(RepostOutcome)
}

/// Checks that need neither the message nor its count, so callers can skip fetching it.
pub fn ignored_reaction(config: &GuildStarboardConfig, emoji: &str, actor: UserId, bot_id: UserId) -> Option<ReactionOutcome> {
    if emoji != config.emoji {
        Some(ReactionOutcome::WrongEmoji)
    } else if actor == bot_id {
        Some(ReactionOutcome::FromSelf)
    } else {
        None
    }
}

pub struct StarboardEngine<S> {
    store: S,
    cache: ConfigCache,
    locks: MessageLocks
}

impl<S: StarboardStore> StarboardEngine<S> {
    pub fn new(store: S) -> Self {
        StarboardEngine {
            store,
            cache: ConfigCache::new(),
            locks: MessageLocks::new()
        }
    }

    pub async fn get_config(&self, guild_id: GuildId) -> Result<Option<GuildStarboardConfig>, StarboardError> {
        if let Some(cached) = self.cache.get(guild_id) {
            return Ok(cached);
        }

        let generation = self.cache.generation(guild_id);
        let config = self.store.get_starboard_config(guild_id).await.map_err(StarboardError::Storage)?;
        if !self.cache.fill(guild_id, generation, config.clone()) {
            debug!("Config for guild {} changed during lookup; not caching it", guild_id);
        }

        Ok(config)
    }

    pub async fn set_config(&self, config: &GuildStarboardConfig) -> Result<(), StarboardError> {
        let result = self.store.replace_starboard_config(config).await.map_err(StarboardError::Storage);
        // Evict even on failure; the stored row may have changed regardless.
        self.cache.invalidate(config.guild_id);

        result
    }

    pub async fn on_reaction_added(
        &self,
        messenger: &impl StarboardMessenger,
        message: &SourceMessage,
        emoji: &str,
        reaction_count: u64,
        actor: UserId
    ) -> Result<ReactionOutcome, StarboardError> {
        let config = match self.get_config(message.guild_id).await? {
            Some(config) => config,
            None => return Ok(ReactionOutcome::NotConfigured)
        };

        if reaction_count < config.threshold {
            return Ok(ReactionOutcome::BelowThreshold);
        }
        if let Some(ignored) = ignored_reaction(&config, emoji, actor, messenger.current_user_id()) {
            return Ok(ignored);
        }

        let outcome = self.post_or_update(messenger, &config, message, reaction_count).await?;

        if !matches!(outcome, RepostOutcome::ChannelMissing) {
            if let Err(ex) = messenger.add_reaction(message.channel_id, message.id, &config.emoji).await {
                debug!("Could not react to starred message {}: {}", message.id, ex);
            }
        }

        Ok(ReactionOutcome::Reposted(outcome))
    }

    pub async fn post_or_update(
        &self,
        messenger: &impl StarboardMessenger,
        config: &GuildStarboardConfig,
        message: &SourceMessage,
        reaction_count: u64
    ) -> Result<RepostOutcome, StarboardError> {
        if !messenger.channel_exists(config.channel_id).await.map_err(StarboardError::Messaging)? {
            debug!("Starboard channel {} for guild {} is gone", config.channel_id, config.guild_id);
            return Ok(RepostOutcome::ChannelMissing);
        }

        let _guard = self.locks.lock(message.id).await;

        let existing = self.store.get_starred_message(message.id).await.map_err(StarboardError::Storage)?;
        match existing {
            Some(record) => self.update_repost(messenger, config, message, &record, reaction_count).await,
            None => self.create_repost(messenger, config, message, reaction_count).await
        }
    }

    pub async fn manual_add(
        &self,
        messenger: &impl StarboardMessenger,
        config: &GuildStarboardConfig,
        channel_id: ChannelId,
        message_id: MessageId
    ) -> Result<RepostOutcome, StarboardError> {
        let message = messenger.fetch_source_message(config.guild_id, channel_id, message_id).await
            .map_err(StarboardError::Messaging)?
            .ok_or(StarboardError::SourceNotFound(message_id))?;

        let reaction_count = message.reaction_count(&config.emoji);
        self.post_or_update(messenger, config, &message, reaction_count).await
    }

    async fn create_repost(
        &self,
        messenger: &impl StarboardMessenger,
        config: &GuildStarboardConfig,
        message: &SourceMessage,
        reaction_count: u64
    ) -> Result<RepostOutcome, StarboardError> {
        let embed = RepostEmbed::for_message(message, &config.emoji, reaction_count);
        let repost_message_id = messenger.send_repost(config.channel_id, &embed).await.map_err(StarboardError::Messaging)?;

        let record = StarredMessageRecord {
            source_message_id: message.id,
            repost_message_id,
            reaction_count
        };

        match self.store.insert_starred_message(&record).await {
            Ok(InsertOutcome::Inserted) => Ok(RepostOutcome::Posted { repost_message_id }),
            Ok(InsertOutcome::Existing(existing)) => {
                debug!("Message {} was starred concurrently; dropping duplicate repost {}", message.id, repost_message_id);
                self.retract_repost(messenger, config.channel_id, repost_message_id).await;
                self.update_repost(messenger, config, message, &existing, reaction_count).await
            }
            Err(ex) => {
                // Without a record the repost would be orphaned and duplicated on the next reaction.
                self.retract_repost(messenger, config.channel_id, repost_message_id).await;
                Err(StarboardError::Storage(ex))
            }
        }
    }

    async fn update_repost(
        &self,
        messenger: &impl StarboardMessenger,
        config: &GuildStarboardConfig,
        message: &SourceMessage,
        record: &StarredMessageRecord,
        reaction_count: u64
    ) -> Result<RepostOutcome, StarboardError> {
        self.store.update_reaction_count(message.id, reaction_count).await.map_err(StarboardError::Storage)?;

        let footer = footer_text(&config.emoji, reaction_count, &message.guild_name);
        let repost_message_id = record.repost_message_id;

        let edit = messenger.edit_repost_footer(config.channel_id, repost_message_id, &footer).await
            .map_err(StarboardError::Messaging)?;

        Ok(match edit {
            FooterEdit::Edited => RepostOutcome::Updated { repost_message_id },
            FooterEdit::RepostMissing => RepostOutcome::UpdatedWithoutEdit { repost_message_id }
        })
    }

    async fn retract_repost(&self, messenger: &impl StarboardMessenger, channel_id: ChannelId, repost_message_id: MessageId) {
        if let Err(ex) = messenger.delete_message(channel_id, repost_message_id).await {
            warn!("Failed to delete duplicate repost {}: {}", repost_message_id, ex);
        }
    }
}
