//! Environment configuration for the two Tikkurila databases: same host and
//! credentials, one connection per database.

use anyhow::{bail, Context, Result};
use std::env;
use toolbridge_mysql::MysqlConnection;

const DEFAULT_PORT: u16 = 3306;
const POOL_SIZE: u32 = 10;

pub struct TikkurilaConfig {
    pub database1: MysqlConnection,
    pub database2: MysqlConnection,
}

impl TikkurilaConfig {
    pub fn from_env() -> Result<Self> {
        let host = required("MYSQL_HOST")?;
        let user = required("MYSQL_USER")?;
        let password = required("MYSQL_PASSWORD")?;
        let database1 = required("MYSQL_DATABASE1")?;
        let database2 = required("MYSQL_DATABASE2")?;
        let port = match env::var("MYSQL_PORT") {
            Ok(raw) => {
                raw.parse::<u16>().with_context(|| format!("invalid MYSQL_PORT '{}'", raw))?
            }
            Err(_) => DEFAULT_PORT,
        };

        let connection = |database: String| MysqlConnection {
            host: host.clone(),
            port,
            database,
            user: user.clone(),
            password: Some(password.clone()),
            connect_timeout_seconds: None,
            max_connections: Some(POOL_SIZE),
        };

        Ok(Self { database1: connection(database1), database2: connection(database2) })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!(
            "Missing required environment variables for MySQL connection. Need MYSQL_HOST, \
             MYSQL_USER, MYSQL_PASSWORD, MYSQL_DATABASE1, and MYSQL_DATABASE2."
        ),
    }
}
