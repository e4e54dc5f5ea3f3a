use serenity::{
    builder::{CreateEmbed, CreateEmbedFooter},
    model::{Colour, Timestamp}
};
use super::starboard_models::SourceMessage;

// Discord caps embed field values at 1024 characters. The first field stops one short of that.
const CONTENT_SPLIT: usize = 1023;
const FIELD_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String
}

/// A rendered repost, independent of the serenity builder so it can be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepostEmbed {
    pub fields: Vec<EmbedField>,
    pub image: Option<String>,
    pub footer: String
}

/// Footer text for a repost. Custom emoji markup does not render in footers, so those read "reactions".
pub fn footer_text(emoji: &str, reaction_count: u64, guild_name: &str) -> String {
    if emoji.is_empty() || reaction_count == 0 {
        return guild_name.to_string();
    }

    let label = if emoji.starts_with('<') { "reactions" } else { emoji };
    format!("{reaction_count} {label} | {guild_name}")
}

/// Splits message content into at most two field values.
pub fn content_segments(content: &str) -> Vec<String> {
    if content.is_empty() {
        return vec![];
    }

    if content.chars().count() <= FIELD_LIMIT {
        return vec![content.to_string()];
    }

    let split = content.char_indices()
        .nth(CONTENT_SPLIT)
        .map(|(index, _)| index)
        .unwrap_or(content.len());

    vec![content[..split].to_string(), content[split..].to_string()]
}

impl RepostEmbed {
    pub fn for_message(msg: &SourceMessage, emoji: &str, reaction_count: u64) -> Self {
        let mut fields = vec![
            EmbedField::new("Author", format!("<@{}>", msg.author_id)),
            EmbedField::new("Channel", format!("<#{}>", msg.channel_id)),
            EmbedField::new("Jump link", format!("[here]({})", msg.jump_url()))
        ];

        let mut segments = content_segments(&msg.content).into_iter();
        if let Some(first) = segments.next() {
            fields.push(EmbedField::new("Content", first));
        }
        if let Some(rest) = segments.next() {
            fields.push(EmbedField::new("Content (continued):", rest));
        }

        if msg.attachment_urls.len() > 1 {
            fields.push(EmbedField::new("Additional attachments:", msg.attachment_urls[1..].join("\n")));
        }

        RepostEmbed {
            fields,
            image: msg.attachment_urls.first().cloned(),
            footer: footer_text(emoji, reaction_count, &msg.guild_name)
        }
    }

    pub fn to_builder(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .colour(Colour::GOLD)
            .footer(CreateEmbedFooter::new(&self.footer))
            .timestamp(Timestamp::now());

        for field in &self.fields {
            embed = embed.field(&field.name, &field.value, true);
        }

        if let Some(image) = &self.image {
            embed = embed.image(image);
        }

        embed
    }
}

impl EmbedField {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        EmbedField { name: name.into(), value: value.into() }
    }
}

#[cfg(test)]
mod tests {
    use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
    use super::*;

    fn message(content: &str, attachments: &[&str]) -> SourceMessage {
        SourceMessage {
            id: MessageId::new(555),
            channel_id: ChannelId::new(44),
            guild_id: GuildId::new(7),
            guild_name: "FIRST Tech Challenge".to_string(),
            author_id: UserId::new(99),
            content: content.to_string(),
            attachment_urls: attachments.iter().map(|s| s.to_string()).collect(),
            reactions: vec![]
        }
    }

    fn field<'a>(embed: &'a RepostEmbed, name: &str) -> Option<&'a str> {
        embed.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }

    #[test]
    fn footer_uses_unicode_emoji() {
        assert_eq!(footer_text("⭐", 3, "FTC"), "3 ⭐ | FTC");
    }

    #[test]
    fn footer_replaces_custom_emoji_markup() {
        assert_eq!(footer_text("<:upvote:1234>", 7, "FTC"), "7 reactions | FTC");
        assert_eq!(footer_text("<a:spin:99>", 2, "FTC"), "2 reactions | FTC");
    }

    #[test]
    fn footer_without_reactions_is_guild_name() {
        assert_eq!(footer_text("⭐", 0, "FTC"), "FTC");
    }

    #[test]
    fn content_of_exactly_1024_chars_stays_in_one_field() {
        let content = "a".repeat(1024);
        let segments = content_segments(&content);
        assert_eq!(segments, vec![content]);
    }

    #[test]
    fn content_of_1025_chars_splits_after_1023() {
        let content = format!("{}{}", "a".repeat(1023), "bc");
        let segments = content_segments(&content);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].chars().count(), 1023);
        assert_eq!(segments[1], "bc");
    }

    #[test]
    fn content_split_counts_characters_not_bytes() {
        let content = "é".repeat(1100);
        let segments = content_segments(&content);
        assert_eq!(segments[0].chars().count(), 1023);
        assert_eq!(segments[1].chars().count(), 77);
    }

    #[test]
    fn empty_content_has_no_field() {
        let embed = RepostEmbed::for_message(&message("", &[]), "⭐", 3);
        assert!(field(&embed, "Content").is_none());
        assert_eq!(embed.fields.len(), 3);
    }

    #[test]
    fn repost_carries_author_channel_and_link() {
        let embed = RepostEmbed::for_message(&message("robots!", &[]), "⭐", 3);

        assert_eq!(field(&embed, "Author"), Some("<@99>"));
        assert_eq!(field(&embed, "Channel"), Some("<#44>"));
        assert_eq!(field(&embed, "Jump link"), Some("[here](https://discord.com/channels/7/44/555)"));
        assert_eq!(field(&embed, "Content"), Some("robots!"));
        assert_eq!(embed.footer, "3 ⭐ | FIRST Tech Challenge");
        assert_eq!(embed.image, None);
    }

    #[test]
    fn first_attachment_is_the_image_and_rest_are_links() {
        let embed = RepostEmbed::for_message(&message("pics", &["https://a/1.png", "https://a/2.png", "https://a/3.png"]), "⭐", 5);

        assert_eq!(embed.image.as_deref(), Some("https://a/1.png"));
        assert_eq!(field(&embed, "Additional attachments:"), Some("https://a/2.png\nhttps://a/3.png"));
    }

    #[test]
    fn single_attachment_has_no_link_list() {
        let embed = RepostEmbed::for_message(&message("pic", &["https://a/1.png"]), "⭐", 5);

        assert_eq!(embed.image.as_deref(), Some("https://a/1.png"));
        assert!(field(&embed, "Additional attachments:").is_none());
    }
}
