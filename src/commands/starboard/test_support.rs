use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

use crate::Error;
use super::starboard_embed::RepostEmbed;
use super::starboard_engine::{FooterEdit, StarboardMessenger, StarboardStore};
use super::starboard_models::*;

pub const BOT_ID: u64 = 1;

#[derive(Default)]
pub struct MemoryStore {
    configs: Mutex<HashMap<GuildId, GuildStarboardConfig>>,
    starred: Mutex<HashMap<MessageId, StarredMessageRecord>>,
    writes: AtomicUsize,
    config_reads: AtomicUsize,
    fail_inserts: AtomicBool
}

impl MemoryStore {
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn config_reads(&self) -> usize {
        self.config_reads.load(Ordering::SeqCst)
    }

    pub fn starred(&self, source_message_id: MessageId) -> Option<StarredMessageRecord> {
        self.starred.lock().unwrap().get(&source_message_id).cloned()
    }

    pub fn starred_count(&self) -> usize {
        self.starred.lock().unwrap().len()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StarboardStore for MemoryStore {
    async fn get_starboard_config(&self, guild_id: GuildId) -> Result<Option<GuildStarboardConfig>, Error> {
        self.config_reads.fetch_add(1, Ordering::SeqCst);
        // Read first, then yield, like a query whose result is in flight.
        let config = self.configs.lock().unwrap().get(&guild_id).cloned();
        tokio::task::yield_now().await;
        Ok(config)
    }

    async fn replace_starboard_config(&self, config: &GuildStarboardConfig) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.configs.lock().unwrap().insert(config.guild_id, config.clone());
        Ok(())
    }

    async fn get_starred_message(&self, source_message_id: MessageId) -> Result<Option<StarredMessageRecord>, Error> {
        tokio::task::yield_now().await;
        Ok(self.starred(source_message_id))
    }

    async fn insert_starred_message(&self, record: &StarredMessageRecord) -> Result<InsertOutcome, Error> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err("insert refused".into());
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut starred = self.starred.lock().unwrap();
        if let Some(existing) = starred.get(&record.source_message_id) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }

        starred.insert(record.source_message_id, record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update_reaction_count(&self, source_message_id: MessageId, reaction_count: u64) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(record) = self.starred.lock().unwrap().get_mut(&source_message_id) {
            record.reaction_count = reaction_count;
        }
        Ok(())
    }
}

pub struct RecordingMessenger {
    channels: HashSet<ChannelId>,
    sources: Mutex<HashMap<MessageId, SourceMessage>>,
    sent: Mutex<Vec<(ChannelId, MessageId, RepostEmbed)>>,
    live: Mutex<HashMap<MessageId, RepostEmbed>>,
    reactions: Mutex<Vec<(MessageId, String)>>,
    next_id: AtomicU64,
    fail_sends: AtomicBool,
    fail_lookups: AtomicBool
}

impl RecordingMessenger {
    pub fn new(channels: &[u64]) -> Self {
        RecordingMessenger {
            channels: channels.iter().map(|id| ChannelId::new(*id)).collect(),
            sources: Mutex::default(),
            sent: Mutex::default(),
            live: Mutex::default(),
            reactions: Mutex::default(),
            next_id: AtomicU64::new(10_000),
            fail_sends: AtomicBool::new(false),
            fail_lookups: AtomicBool::new(false)
        }
    }

    pub fn add_source(&self, message: SourceMessage) {
        self.sources.lock().unwrap().insert(message.id, message);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Channel and message lookups fail as if Discord refused or timed out.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Every repost ever sent, including ones deleted afterwards.
    pub fn sent(&self) -> Vec<(ChannelId, MessageId, RepostEmbed)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn live_repost(&self, message_id: MessageId) -> Option<RepostEmbed> {
        self.live.lock().unwrap().get(&message_id).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn reactions_added(&self) -> Vec<(MessageId, String)> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl StarboardMessenger for RecordingMessenger {
    fn current_user_id(&self) -> UserId {
        UserId::new(BOT_ID)
    }

    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool, Error> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err("503 service unavailable".into());
        }
        Ok(self.channels.contains(&channel_id))
    }

    async fn fetch_source_message(&self, _guild_id: GuildId, channel_id: ChannelId, message_id: MessageId) -> Result<Option<SourceMessage>, Error> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err("403 missing access".into());
        }
        Ok(self.sources.lock().unwrap()
            .get(&message_id)
            .filter(|m| m.channel_id == channel_id)
            .cloned())
    }

    async fn send_repost(&self, channel_id: ChannelId, embed: &RepostEmbed) -> Result<MessageId, Error> {
        tokio::task::yield_now().await;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err("missing permissions".into());
        }

        let id = MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push((channel_id, id, embed.clone()));
        self.live.lock().unwrap().insert(id, embed.clone());
        Ok(id)
    }

    async fn edit_repost_footer(&self, _channel_id: ChannelId, message_id: MessageId, footer: &str) -> Result<FooterEdit, Error> {
        match self.live.lock().unwrap().get_mut(&message_id) {
            Some(embed) => {
                embed.footer = footer.to_string();
                Ok(FooterEdit::Edited)
            }
            None => Ok(FooterEdit::RepostMissing)
        }
    }

    async fn delete_message(&self, _channel_id: ChannelId, message_id: MessageId) -> Result<(), Error> {
        match self.live.lock().unwrap().remove(&message_id) {
            Some(_) => Ok(()),
            None => Err("unknown message".into())
        }
    }

    async fn add_reaction(&self, _channel_id: ChannelId, message_id: MessageId, emoji: &str) -> Result<(), Error> {
        self.reactions.lock().unwrap().push((message_id, emoji.to_string()));
        Ok(())
    }
}
