use std::env;

/// Connection settings. Every variable has the stock development-server
/// default, so an unconfigured environment points at a local Odoo.
#[derive(Debug, Clone)]
pub struct OdooConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
}

impl OdooConfig {
    pub fn from_env() -> Self {
        let url = env::var("ODOO_URL").unwrap_or_else(|_| "http://localhost:8069".to_string());
        Self {
            url: url.trim_end_matches('/').to_string(),
            db: env::var("ODOO_DB").unwrap_or_else(|_| "odoo".to_string()),
            username: env::var("ODOO_USER").unwrap_or_else(|_| "admin".to_string()),
            password: env::var("ODOO_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
        }
    }
}
