//! Backend seam for the WhatsApp Cloud API. Tool handlers only ever talk to
//! this trait, so tests can substitute a recording double for the HTTP client.

use crate::error::WhatsappResult;
use async_trait::async_trait;
use serde_json::Value;

/// Typed surface over the Graph API endpoints this server uses. Methods
/// return the raw response body; callers decide how much of it to interpret.
#[async_trait]
pub trait WhatsappApi: Send + Sync {
    async fn send_text(&self, to: &str, body: &str, preview_url: bool) -> WhatsappResult<Value>;

    async fn send_template(
        &self,
        to: &str,
        template_name: &str,
        language_code: &str,
        components: &[Value],
    ) -> WhatsappResult<Value>;

    async fn send_media(
        &self,
        to: &str,
        media_type: &str,
        media_url: &str,
        caption: Option<&str>,
        filename: Option<&str>,
    ) -> WhatsappResult<Value>;

    async fn mark_as_read(&self, message_id: &str) -> WhatsappResult<Value>;

    async fn list_templates(&self, limit: u32) -> WhatsappResult<Value>;

    async fn create_template(
        &self,
        name: &str,
        category: &str,
        language: &str,
        components: &[Value],
    ) -> WhatsappResult<Value>;

    async fn list_phone_numbers(&self) -> WhatsappResult<Value>;
}
