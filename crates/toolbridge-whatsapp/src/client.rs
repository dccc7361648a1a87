use crate::api::WhatsappApi;
use crate::config::WhatsappConfig;
use crate::error::{WhatsappError, WhatsappResult};
use async_trait::async_trait;
use reqwest::{header, Method};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed [`WhatsappApi`] implementation against the Graph API.
pub struct WhatsappClient {
    http: reqwest::Client,
    base_url: String,
    phone_number_id: String,
    business_account_id: String,
}

impl WhatsappClient {
    pub fn new(config: &WhatsappConfig) -> WhatsappResult<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| {
                WhatsappError::InvalidConfig(
                    "WHATSAPP_ACCESS_TOKEN contains characters not allowed in a header"
                        .to_string(),
                )
            })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(concat!("toolbridge-whatsapp/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            phone_number_id: config.phone_number_id.clone(),
            business_account_id: config.business_account_id.clone(),
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> WhatsappResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Keep the Graph error payload: status line first, body appended
            let message = match serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| serde_json::to_string_pretty(&body).ok())
            {
                Some(body) => {
                    format!("Request failed with status code {}\n{}", status.as_u16(), body)
                }
                None => format!("Request failed with status code {}", status.as_u16()),
            };
            return Err(WhatsappError::Api { status: status.as_u16(), message });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn messages_path(&self) -> String {
        format!("/{}/messages", self.phone_number_id)
    }

    fn account_path(&self, resource: &str) -> String {
        format!("/{}/{}", self.business_account_id, resource)
    }
}

#[async_trait]
impl WhatsappApi for WhatsappClient {
    async fn send_text(&self, to: &str, body: &str, preview_url: bool) -> WhatsappResult<Value> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "preview_url": preview_url, "body": body },
        });
        self.request(Method::POST, &self.messages_path(), &[], Some(payload)).await
    }

    async fn send_template(
        &self,
        to: &str,
        template_name: &str,
        language_code: &str,
        components: &[Value],
    ) -> WhatsappResult<Value> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "template",
            "template": {
                "name": template_name,
                "language": { "code": language_code },
                "components": components,
            },
        });
        self.request(Method::POST, &self.messages_path(), &[], Some(payload)).await
    }

    async fn send_media(
        &self,
        to: &str,
        media_type: &str,
        media_url: &str,
        caption: Option<&str>,
        filename: Option<&str>,
    ) -> WhatsappResult<Value> {
        let mut media = json!({ "link": media_url });
        if let Some(caption) = caption {
            media["caption"] = json!(caption);
        }
        // The Graph API only accepts a filename on document messages
        if media_type == "document" {
            if let Some(filename) = filename {
                media["filename"] = json!(filename);
            }
        }

        let mut payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": media_type,
        });
        payload[media_type] = media;
        self.request(Method::POST, &self.messages_path(), &[], Some(payload)).await
    }

    async fn mark_as_read(&self, message_id: &str) -> WhatsappResult<Value> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "status": "read",
            "message_id": message_id,
        });
        self.request(Method::POST, &self.messages_path(), &[], Some(payload)).await
    }

    async fn list_templates(&self, limit: u32) -> WhatsappResult<Value> {
        self.request(
            Method::GET,
            &self.account_path("message_templates"),
            &[("limit", limit.to_string())],
            None,
        )
        .await
    }

    async fn create_template(
        &self,
        name: &str,
        category: &str,
        language: &str,
        components: &[Value],
    ) -> WhatsappResult<Value> {
        let payload = json!({
            "name": name,
            "category": category,
            "language": language,
            "components": components,
        });
        self.request(Method::POST, &self.account_path("message_templates"), &[], Some(payload))
            .await
    }

    async fn list_phone_numbers(&self) -> WhatsappResult<Value> {
        self.request(Method::GET, &self.account_path("phone_numbers"), &[], None).await
    }
}
