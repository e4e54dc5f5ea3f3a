mod general;
pub mod starboard;

use std::collections::HashSet;
use serenity::model::id::UserId;
use tracing::error;

use general::*;
use starboard::*;
use crate::{DozerContext, Error};

#[poise::command(prefix_command, track_edits, slash_command)]
async fn help(
    ctx: DozerContext<'_>,
    #[description = "The command requested for help"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
        .await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, (), Error>) {
    match error {
        poise::FrameworkError::CooldownHit { remaining_cooldown, ctx, .. } => {
            // Why round up when we can add one?
            if let Err(ex) = ctx.say(format!("This command is rate-limited, please try this again in {} seconds.", remaining_cooldown.as_secs() + 1)).await {
                error!("Failed to send rate-limit message: {}", ex);
            }
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command {} failed: {}", ctx.command().qualified_name, error);
            if let Err(ex) = ctx.say("Something went wrong running that command...").await {
                error!("Failed to send error message: {}", ex);
            }
        }
        other => {
            if let Err(ex) = poise::builtins::on_error(other).await {
                error!("Failed to handle framework error: {}", ex);
            }
        }
    }
}

pub fn get_framework(pref: &str, owners: HashSet<UserId>) -> poise::FrameworkOptions<(), Error> {
    poise::FrameworkOptions {
        commands: vec![
            help(),
            info(),
            register(),
            starboard()
        ],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(pref.to_string()),
            mention_as_prefix: true,
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        owners,
        ..Default::default()
    }
}
