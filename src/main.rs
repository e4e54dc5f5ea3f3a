mod models;
mod commands;
mod services;

use std::collections::HashSet;
use std::sync::Arc;
use std::env;
use std::error;
use commands::get_framework;
use commands::starboard::{Starboard, starboard_engine::StarboardEngine};
use models::config::Config;
use services::{bot_init, database::Database};
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    model::{channel::Reaction, gateway::{Ready, GatewayIntents}, id::UserId},
    http::Http
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

type Error = Box<dyn error::Error + Send + Sync>;
type DozerContext<'a> = poise::Context<'a, (), Error>;

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn reaction_add(&self, ctx: Context, added_reaction: Reaction) {
        commands::starboard::starboard_handler::add_reaction(&ctx, &added_reaction).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        bot_init::ready(&ctx, &ready).await;
    }
}

fn init_logger(log_directory: &str) -> Result<WorkerGuard, Error> {
    let file_appender = tracing_appender::rolling::hourly(log_directory, "dozer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing::subscriber::set_global_default(
        fmt::Subscriber::builder()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .with_ansi(true)
            .with_max_level(tracing::Level::DEBUG)
            .finish()
            .with(fmt::Layer::default().with_writer(non_blocking))
    )?;

    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");
    info!("Initializing Dozer v{}", VERSION.unwrap_or("<unknown>"));
    info!("Reading from {}", env::current_dir()?.display());

    Ok(guard)
}

async fn fetch_owners(token: &str) -> Result<HashSet<UserId>, Error> {
    let http = Http::new(token);
    let info = http.get_current_application_info().await?;

    let mut owners = HashSet::new();
    if let Some(team) = info.team {
        owners.insert(team.owner_user_id);
    } else if let Some(owner) = info.owner {
        owners.insert(owner.id);
    }

    Ok(owners)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load("config.json")?;
    // Dropping the guard stops the file writer, so it lives as long as main.
    let _guard = init_logger(&config.log_directory)?;

    let owners = fetch_owners(&config.token).await?;
    let database = Database::new(&config).await?;
    let starboard = Arc::new(StarboardEngine::new(database));

    let framework = poise::Framework::builder()
        .options(get_framework(&config.cmd_prefix, owners))
        .setup(|_ctx, _ready, _framework| {
            Box::pin(async move {
                Ok(())
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.token, intents)
        .framework(framework)
        .event_handler(Handler)
        .type_map_insert::<Starboard>(starboard)
        .await?;

    if let Err(ex) = client.start().await {
        error!("Discord bot client error: {:?}", ex);
    }

    Ok(())
}
