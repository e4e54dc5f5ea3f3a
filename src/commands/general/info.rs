use poise::CreateReply;
use serenity::{
    builder::CreateEmbed,
    model::Colour
};
use crate::{DozerContext, Error};

fn about_embed(version: &str, guild_count: usize, prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Dozer v{version}"))
        .description("Reposts the FIRST community's finest messages to a starboard.")
        .colour(Colour::GOLD)
        .field("Servers", guild_count.to_string(), true)
        .field("Getting started", format!("`{prefix}help starboard`"), true)
}

#[poise::command(
    prefix_command,
    slash_command,
    description_localized("en-US", "Info about this bot.")
)]
pub async fn info(ctx: DozerContext<'_>) -> Result<(), Error> {
    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");
    let guild_count = ctx.serenity_context().cache.guild_count();
    let embed = about_embed(VERSION.unwrap_or("<unknown>"), guild_count, ctx.prefix());

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Registers or unregisters application commands in this guild or globally
#[poise::command(prefix_command, hide_in_help, owners_only)]
pub async fn register(ctx: DozerContext<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx).await?;

    Ok(())
}
