pub mod bot_init;
pub mod database;
