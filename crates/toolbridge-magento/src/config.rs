//! Environment configuration for the Magento database connection.

use anyhow::{bail, Context, Result};
use std::env;
use toolbridge_mysql::MysqlConnection;

const DEFAULT_HOST: &str = "port.softcroft.ie";
const DEFAULT_PORT: u16 = 40000;
const DEFAULT_DATABASE: &str = "a35dda22_mage2";

/// Read the connection settings. Credentials are required; host, port and
/// database fall back to the production Magento instance.
pub fn connection_from_env() -> Result<MysqlConnection> {
    let user = match env::var("MAGENTO_DB_USER") {
        Ok(value) if !value.is_empty() => value,
        _ => bail!("MAGENTO_DB_USER environment variable is required"),
    };
    let password = match env::var("MAGENTO_DB_PASSWORD") {
        Ok(value) if !value.is_empty() => value,
        _ => bail!("MAGENTO_DB_PASSWORD environment variable is required"),
    };
    let port = match env::var("MAGENTO_DB_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid MAGENTO_DB_PORT '{}'", raw))?,
        Err(_) => DEFAULT_PORT,
    };

    Ok(MysqlConnection {
        host: env::var("MAGENTO_DB_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        port,
        database: env::var("MAGENTO_DB_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
        user,
        password: Some(password),
        connect_timeout_seconds: None,
        max_connections: None,
    })
}
