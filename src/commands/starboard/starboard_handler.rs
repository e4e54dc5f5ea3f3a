use serenity::{
    client::Context,
    model::channel::Reaction
};
use tracing::{debug, warn};

use crate::starboard;
use super::starboard_engine::ignored_reaction;
use super::starboard_messenger::DiscordMessenger;
use super::starboard_models::SourceMessage;

// Nothing here may fail loudly; a dropped update is retried by the next qualifying reaction.
pub async fn add_reaction(ctx: &Context, reaction: &Reaction) {
    let guild_id = match reaction.guild_id {
        Some(guild_id) => guild_id,
        None => return
    };
    let actor = match reaction.user_id {
        Some(actor) => actor,
        None => return
    };

    let starboard = starboard!(ctx);

    // Skip the message fetch for guilds without a starboard and for reactions that can never count.
    let config = match starboard.get_config(guild_id).await {
        Ok(Some(config)) => config,
        Ok(None) => return,
        Err(ex) => {
            warn!("Failed to load starboard config for guild {}: {}", guild_id, ex);
            return;
        }
    };

    let emoji = reaction.emoji.to_string();
    if let Some(outcome) = ignored_reaction(&config, &emoji, actor, ctx.cache.current_user().id) {
        debug!("Starboard ignored reaction on {}: {:?}", reaction.message_id, outcome);
        return;
    }

    let msg = match reaction.message(ctx.http.as_ref()).await {
        Ok(msg) => msg,
        Err(ex) => {
            debug!("Failed to fetch reacted message {}: {}", reaction.message_id, ex);
            return;
        }
    };

    let messenger = DiscordMessenger::new(ctx);
    let source = SourceMessage::from_message(&msg, guild_id, messenger.guild_name(guild_id));
    let reaction_count = source.reaction_count(&emoji);

    match starboard.on_reaction_added(&messenger, &source, &emoji, reaction_count, actor).await {
        Ok(outcome) => debug!("Starboard handled reaction on {}: {:?}", msg.id, outcome),
        Err(ex) => warn!("Dropped starboard update for message {}: {}", msg.id, ex)
    }
}
