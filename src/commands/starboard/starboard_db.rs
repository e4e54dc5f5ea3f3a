use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId};

use crate::Error;
use crate::services::database::{Database, id_column, to_decimal};
use super::starboard_engine::StarboardStore;
use super::starboard_models::*;

#[async_trait]
impl StarboardStore for Database {
    async fn get_starboard_config(&self, guild_id: GuildId) -> Result<Option<GuildStarboardConfig>, Error> {
        let mut conn = self.pool.get().await?;
        let guild = to_decimal(guild_id.get());
        let res = conn.query(
            "SELECT channel_id, emoji, threshold FROM [Starboard].[Config] WHERE guild_id = @P1;",
            &[&guild])
            .await?
            .into_row()
            .await?;

        match res {
            Some(row) => {
                let emoji: Option<&str> = row.get(1);
                let threshold: Option<i64> = row.get(2);

                Ok(Some(GuildStarboardConfig {
                    guild_id,
                    channel_id: ChannelId::new(id_column(&row, 0)?),
                    emoji: emoji.unwrap_or_default().to_string(),
                    threshold: threshold.unwrap_or_default().max(0) as u64
                }))
            }
            None => Ok(None)
        }
    }

    async fn replace_starboard_config(&self, config: &GuildStarboardConfig) -> Result<(), Error> {
        let mut conn = self.pool.get().await?;
        let guild = to_decimal(config.guild_id.get());
        let channel = to_decimal(config.channel_id.get());
        let threshold = i64::try_from(config.threshold)?;

        conn.execute(
            "SET XACT_ABORT ON;
            BEGIN TRANSACTION;
            DELETE FROM [Starboard].[Config] WHERE guild_id = @P1;
            INSERT INTO [Starboard].[Config] (guild_id, channel_id, emoji, threshold) VALUES (@P1, @P2, @P3, @P4);
            COMMIT TRANSACTION;",
            &[&guild, &channel, &config.emoji.as_str(), &threshold])
            .await?;

        Ok(())
    }

    async fn get_starred_message(&self, source_message_id: MessageId) -> Result<Option<StarredMessageRecord>, Error> {
        let mut conn = self.pool.get().await?;
        let message = to_decimal(source_message_id.get());
        let res = conn.query(
            "SELECT starboard_message_id, reaction_count FROM [Starboard].[Message] WHERE message_id = @P1;",
            &[&message])
            .await?
            .into_row()
            .await?;

        match res {
            Some(row) => {
                let reaction_count: Option<i64> = row.get(1);

                Ok(Some(StarredMessageRecord {
                    source_message_id,
                    repost_message_id: MessageId::new(id_column(&row, 0)?),
                    reaction_count: reaction_count.unwrap_or_default().max(0) as u64
                }))
            }
            None => Ok(None)
        }
    }

    async fn insert_starred_message(&self, record: &StarredMessageRecord) -> Result<InsertOutcome, Error> {
        let mut conn = self.pool.get().await?;
        let message = to_decimal(record.source_message_id.get());
        let repost = to_decimal(record.repost_message_id.get());
        let reaction_count = i64::try_from(record.reaction_count)?;

        // The range lock makes check-and-insert a single atomic step; the primary key backs it up.
        let res = conn.query(
            "SET NOCOUNT ON;
            DECLARE @inserted BIT = 0;
            INSERT INTO [Starboard].[Message] (message_id, starboard_message_id, reaction_count)
                SELECT @P1, @P2, @P3
                WHERE NOT EXISTS (SELECT 1 FROM [Starboard].[Message] WITH (UPDLOCK, HOLDLOCK) WHERE message_id = @P1);
            IF @@ROWCOUNT > 0 SET @inserted = 1;
            SELECT @inserted, starboard_message_id, reaction_count FROM [Starboard].[Message] WHERE message_id = @P1;",
            &[&message, &repost, &reaction_count])
            .await?
            .into_row()
            .await?
            .ok_or("starred message vanished after insert")?;

        let inserted: Option<bool> = res.get(0);
        if inserted.unwrap_or_default() {
            return Ok(InsertOutcome::Inserted);
        }

        let existing_count: Option<i64> = res.get(2);
        Ok(InsertOutcome::Existing(StarredMessageRecord {
            source_message_id: record.source_message_id,
            repost_message_id: MessageId::new(id_column(&res, 1)?),
            reaction_count: existing_count.unwrap_or_default().max(0) as u64
        }))
    }

    async fn update_reaction_count(&self, source_message_id: MessageId, reaction_count: u64) -> Result<(), Error> {
        let mut conn = self.pool.get().await?;
        let message = to_decimal(source_message_id.get());
        let reaction_count = i64::try_from(reaction_count)?;

        conn.execute(
            "UPDATE [Starboard].[Message] SET reaction_count = @P2 WHERE message_id = @P1;",
            &[&message, &reaction_count])
            .await?;

        Ok(())
    }
}
