mod starboard_cache;
mod starboard_config;
mod starboard_db;
mod starboard_embed;
pub mod starboard_engine;
pub mod starboard_handler;
mod starboard_messenger;
mod starboard_models;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use serenity::prelude::TypeMapKey;
use starboard_config::*;
use starboard_engine::StarboardEngine;
use crate::{DozerContext, Error};
use crate::services::database::Database;

pub type Starboard = StarboardEngine<Database>;

impl TypeMapKey for Starboard {
    type Value = Arc<Starboard>;
}

/// Show the current server's starboard configuration.
///
/// A starboard (or a hall of fame) is a channel the bot will repost messages in if they receive a certain number of configured reactions.
/// To configure a starboard, use the `starboard config` subcommand.
#[poise::command(prefix_command, slash_command,
    subcommands("info", "config", "add"),
    discard_spare_arguments,
    description_localized("en-US", "Commands for viewing and configuring the starboard."),
    guild_only,
    required_bot_permissions = "EMBED_LINKS",
    identifying_name = "Starboard"
)]
pub async fn starboard(ctx: DozerContext<'_>) -> Result<(), Error> {
    info_code(ctx).await
}
