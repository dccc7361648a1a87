//! WhatsApp Cloud API adapter: message sending, template management and
//! phone-number listing over the Graph API.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod tools;

pub use api::WhatsappApi;
pub use client::WhatsappClient;
pub use config::{WebhookSettings, WhatsappConfig};
pub use error::{WhatsappError, WhatsappResult};
pub use tools::{WhatsappTool, WhatsappToolSet};
