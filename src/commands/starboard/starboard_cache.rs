use std::sync::Arc;
use dashmap::DashMap;
use serenity::model::id::{GuildId, MessageId};
use tokio::sync::{Mutex, OwnedMutexGuard};
use super::starboard_models::GuildStarboardConfig;

/// Read-through cache of guild configurations. `None` entries record that a guild has no starboard.
///
/// Every invalidation bumps the guild's generation, and a fill is only kept if the generation
/// it was read under is still current, so a lookup racing a reconfiguration cannot cache the old row.
#[derive(Default)]
pub struct ConfigCache {
    entries: DashMap<GuildId, Option<GuildStarboardConfig>>,
    generations: DashMap<GuildId, u64>
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer `None` is a miss; `Some(None)` is a cached "not configured".
    pub fn get(&self, guild_id: GuildId) -> Option<Option<GuildStarboardConfig>> {
        self.entries.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Take this before reading the store; pass it back to `fill`.
    pub fn generation(&self, guild_id: GuildId) -> u64 {
        self.generations.get(&guild_id).map(|generation| *generation).unwrap_or(0)
    }

    /// Caches `config` unless the guild was invalidated since `generation` was taken.
    pub fn fill(&self, guild_id: GuildId, generation: u64, config: Option<GuildStarboardConfig>) -> bool {
        // The generation entry stays locked until the fill is done, so `invalidate` cannot slip in between.
        let current = self.generations.entry(guild_id).or_insert(0);
        if *current != generation {
            return false;
        }

        self.entries.insert(guild_id, config);
        true
    }

    pub fn invalidate(&self, guild_id: GuildId) {
        let mut current = self.generations.entry(guild_id).or_insert(0);
        *current += 1;
        self.entries.remove(&guild_id);
    }
}

/// Serializes repost-or-update work per source message within this process.
#[derive(Default)]
pub struct MessageLocks {
    locks: DashMap<MessageId, Arc<Mutex<()>>>
}

pub struct MessageLockGuard<'a> {
    owner: &'a MessageLocks,
    message_id: MessageId,
    guard: Option<OwnedMutexGuard<()>>
}

impl MessageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, message_id: MessageId) -> MessageLockGuard<'_> {
        let mutex = self.locks.entry(message_id).or_default().value().clone();
        let guard = mutex.lock_owned().await;

        MessageLockGuard { owner: self, message_id, guard: Some(guard) }
    }

    fn release(&self, message_id: MessageId) {
        // The map holding the last reference means nobody is waiting.
        self.locks.remove_if(&message_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for MessageLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.owner.release(self.message_id);
    }
}
