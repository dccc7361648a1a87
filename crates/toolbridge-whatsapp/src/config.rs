//! Environment configuration for the WhatsApp Cloud API. Credentials and the
//! account ids are required; webhook settings and the API root have defaults.

use anyhow::{bail, Result};
use std::env;

const DEFAULT_API_URL: &str = "https://graph.facebook.com/v18.0";
const DEFAULT_WEBHOOK_URL: &str = "https://your-domain.com/webhook/whatsapp";
const DEFAULT_VERIFY_TOKEN: &str = "mcp_webhook_verify_token";

pub struct WhatsappConfig {
    pub api_url: String,
    pub access_token: String,
    pub phone_number_id: String,
    pub business_account_id: String,
    pub webhook_url: String,
    pub webhook_verify_token: String,
}

/// The subset of the configuration the webhook info tool reports.
#[derive(Clone)]
pub struct WebhookSettings {
    pub url: String,
    pub verify_token: String,
}

impl WhatsappConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: env::var("WHATSAPP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            access_token: required("WHATSAPP_ACCESS_TOKEN")?,
            phone_number_id: required("WHATSAPP_PHONE_NUMBER_ID")?,
            business_account_id: required("WHATSAPP_BUSINESS_ACCOUNT_ID")?,
            webhook_url: env::var("WHATSAPP_WEBHOOK_URL")
                .unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string()),
            webhook_verify_token: env::var("WHATSAPP_WEBHOOK_VERIFY_TOKEN")
                .unwrap_or_else(|_| DEFAULT_VERIFY_TOKEN.to_string()),
        })
    }

    pub fn webhook_settings(&self) -> WebhookSettings {
        WebhookSettings {
            url: self.webhook_url.clone(),
            verify_token: self.webhook_verify_token.clone(),
        }
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!(
            "Missing required environment variables for the WhatsApp Cloud API. Need \
             WHATSAPP_ACCESS_TOKEN, WHATSAPP_PHONE_NUMBER_ID, and WHATSAPP_BUSINESS_ACCOUNT_ID."
        ),
    }
}
