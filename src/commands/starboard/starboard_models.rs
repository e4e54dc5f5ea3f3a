use serenity::model::{
    channel::Message,
    id::{ChannelId, GuildId, MessageId, UserId}
};

/// Per-guild starboard settings. Replaced wholesale on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildStarboardConfig {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    /// Reaction markup, compared by exact string equality (`⭐`, `<:name:id>`, `<a:name:id>`).
    pub emoji: String,
    pub threshold: u64
}

/// Maps a source message to its repost in the starboard channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarredMessageRecord {
    pub source_message_id: MessageId,
    pub repost_message_id: MessageId,
    pub reaction_count: u64
}

/// Result of the atomic insert-if-absent on [`StarredMessageRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Existing(StarredMessageRecord)
}

/// The parts of a chat message the starboard needs, detached from the gateway model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub guild_name: String,
    pub author_id: UserId,
    pub content: String,
    pub attachment_urls: Vec<String>,
    /// Current count per reaction, keyed by reaction markup.
    pub reactions: Vec<(String, u64)>
}

impl SourceMessage {
    // Messages fetched over HTTP carry no guild id, so the caller supplies it.
    pub fn from_message(msg: &Message, guild_id: GuildId, guild_name: impl Into<String>) -> Self {
        SourceMessage {
            id: msg.id,
            channel_id: msg.channel_id,
            guild_id,
            guild_name: guild_name.into(),
            author_id: msg.author.id,
            content: msg.content.clone(),
            attachment_urls: msg.attachments.iter().map(|a| a.url.clone()).collect(),
            reactions: msg.reactions.iter()
                .map(|r| (r.reaction_type.to_string(), r.count))
                .collect()
        }
    }

    pub fn jump_url(&self) -> String {
        format!("https://discord.com/channels/{}/{}/{}", self.guild_id, self.channel_id, self.id)
    }

    pub fn reaction_count(&self, emoji: &str) -> u64 {
        self.reactions.iter()
            .find(|(markup, _)| markup == emoji)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}
