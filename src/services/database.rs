use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use tiberius::{AuthMethod, EncryptionLevel, Row};
use tracing::info;

use crate::Error;
use crate::models::config::Config;

pub struct Database {
    pub(crate) pool: Pool<ConnectionManager>
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let mut sql_config = tiberius::Config::new();
        sql_config.host(&config.sql_server_ip);
        sql_config.port(config.sql_server_port);
        sql_config.database(&config.sql_server_database);
        sql_config.authentication(AuthMethod::sql_server(&config.sql_server_username, &config.sql_server_password));
        sql_config.encryption(EncryptionLevel::NotSupported);

        let manager = ConnectionManager::new(sql_config);
        let pool = Pool::builder()
            .max_size(8)
            .build(manager)
            .await?;

        info!("Connected to SQL Server at {}:{}", config.sql_server_ip, config.sql_server_port);

        Ok(Database { pool })
    }
}

// Snowflakes overflow BIGINT, so they are stored as DECIMAL(20, 0).
pub fn to_decimal(id: u64) -> Decimal {
    Decimal::from(id)
}

pub fn id_column(row: &Row, index: usize) -> Result<u64, Error> {
    let value: Option<Decimal> = row.get(index);
    value
        .and_then(|o| o.to_u64())
        .filter(|id| *id != 0)
        .ok_or_else(|| format!("column {index} is not a valid snowflake").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflakes_survive_decimal_conversion() {
        let snowflake = u64::MAX - 12345;
        assert_eq!(to_decimal(snowflake).to_u64(), Some(snowflake));
    }
}
