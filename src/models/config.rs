use std::{error, fs, path::Path};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub token: String,
    pub cmd_prefix: String,
    pub sql_server_ip: String,
    pub sql_server_port: u16,
    pub sql_server_username: String,
    pub sql_server_password: String,
    #[serde(default = "default_database")]
    pub sql_server_database: String,
    #[serde(default = "default_log_directory")]
    pub log_directory: String
}

fn default_database() -> String {
    "Dozer".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn error::Error + Send + Sync>> {
        let path = path.as_ref();
        let config_json = fs::read_to_string(path)
            .map_err(|ex| format!("{} could not be read: {ex}", path.display()))?;

        Self::parse(&config_json)
            .map_err(|ex| format!("{} is malformed: {ex}", path.display()).into())
    }

    fn parse(config_json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(config_json)
    }
}
