//! Environment configuration for the Sage MSSQL connection. All four
//! connection settings are required; only the port has a default.

use anyhow::{bail, Context, Result};
use std::env;

const DEFAULT_PORT: u16 = 1433;

pub struct SageConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl SageConfig {
    pub fn from_env() -> Result<Self> {
        let server = required("MSSQL_SERVER")?;
        let database = required("MSSQL_DATABASE")?;
        let user = required("MSSQL_USER")?;
        let password = required("MSSQL_PASSWORD")?;
        let port = match env::var("MSSQL_PORT") {
            Ok(raw) => {
                raw.parse::<u16>().with_context(|| format!("invalid MSSQL_PORT '{}'", raw))?
            }
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self { server, port, database, user, password })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!(
            "Missing required environment variables for MSSQL connection. Need MSSQL_SERVER, \
             MSSQL_DATABASE, MSSQL_USER, and MSSQL_PASSWORD."
        ),
    }
}
