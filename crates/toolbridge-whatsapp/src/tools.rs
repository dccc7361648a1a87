//! Tool catalog and dispatch for the WhatsApp server. Results are the
//! human-readable confirmation texts the original service produced rather
//! than raw API bodies.

use crate::api::WhatsappApi;
use crate::config::WebhookSettings;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolbridge_mcp::protocol::{
    json_schema_array, json_schema_boolean, json_schema_enum, json_schema_number,
    json_schema_object, json_schema_string, with_default,
};
use toolbridge_mcp::{parse_args, CallToolResult, Tool, ToolCatalog, ToolSet};

fn default_language() -> String {
    "en_US".to_string()
}

fn default_template_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
struct SendMessageArgs {
    to: String,
    message: String,
    #[serde(default)]
    preview_url: bool,
}

#[derive(Debug, Deserialize)]
struct SendTemplateArgs {
    to: String,
    template_name: String,
    #[serde(default = "default_language")]
    language_code: String,
    #[serde(default)]
    components: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MediaType {
    Image,
    Video,
    Document,
    Audio,
}

impl MediaType {
    fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Document => "document",
            MediaType::Audio => "audio",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendMediaArgs {
    to: String,
    media_type: MediaType,
    media_url: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateListArgs {
    #[serde(default = "default_template_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum TemplateCategory {
    Authentication,
    Marketing,
    Utility,
}

impl TemplateCategory {
    fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Authentication => "AUTHENTICATION",
            TemplateCategory::Marketing => "MARKETING",
            TemplateCategory::Utility => "UTILITY",
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateTemplateArgs {
    name: String,
    category: TemplateCategory,
    #[serde(default = "default_language")]
    language: String,
    components: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct MarkAsReadArgs {
    message_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhatsappTool {
    SendMessage,
    SendTemplate,
    SendMedia,
    GetMessageTemplates,
    CreateTemplate,
    GetWebhookInfo,
    MarkAsRead,
    GetPhoneNumbers,
}

impl WhatsappTool {
    pub const ALL: [WhatsappTool; 8] = [
        WhatsappTool::SendMessage,
        WhatsappTool::SendTemplate,
        WhatsappTool::SendMedia,
        WhatsappTool::GetMessageTemplates,
        WhatsappTool::CreateTemplate,
        WhatsappTool::GetWebhookInfo,
        WhatsappTool::MarkAsRead,
        WhatsappTool::GetPhoneNumbers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WhatsappTool::SendMessage => "send_message",
            WhatsappTool::SendTemplate => "send_template",
            WhatsappTool::SendMedia => "send_media",
            WhatsappTool::GetMessageTemplates => "get_message_templates",
            WhatsappTool::CreateTemplate => "create_template",
            WhatsappTool::GetWebhookInfo => "get_webhook_info",
            WhatsappTool::MarkAsRead => "mark_as_read",
            WhatsappTool::GetPhoneNumbers => "get_phone_numbers",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|tool| tool.name() == name).copied()
    }

    pub fn descriptor(&self) -> Tool {
        let description = match self {
            WhatsappTool::SendMessage => "Send a WhatsApp message to a phone number",
            WhatsappTool::SendTemplate => "Send a WhatsApp template message",
            WhatsappTool::SendMedia => "Send media (image, video, document) via WhatsApp",
            WhatsappTool::GetMessageTemplates => {
                "Get list of approved WhatsApp message templates"
            }
            WhatsappTool::CreateTemplate => "Create a new WhatsApp message template",
            WhatsappTool::GetWebhookInfo => {
                "Get webhook configuration information for receiving messages"
            }
            WhatsappTool::MarkAsRead => "Mark a received message as read",
            WhatsappTool::GetPhoneNumbers => {
                "Get list of WhatsApp phone numbers for the business account"
            }
        };
        let schema = match self {
            WhatsappTool::SendMessage => json_schema_object(
                &[
                    (
                        "to",
                        json_schema_string(
                            "Recipient phone number with country code (e.g., 353851234567)",
                        ),
                    ),
                    ("message", json_schema_string("Text message to send")),
                    (
                        "preview_url",
                        with_default(json_schema_boolean("Enable URL preview"), json!(false)),
                    ),
                ],
                &["to", "message"],
            ),
            WhatsappTool::SendTemplate => json_schema_object(
                &[
                    ("to", json_schema_string("Recipient phone number with country code")),
                    ("template_name", json_schema_string("Template name")),
                    (
                        "language_code",
                        with_default(
                            json_schema_string("Language code (e.g., en_US)"),
                            json!("en_US"),
                        ),
                    ),
                    (
                        "components",
                        with_default(
                            json_schema_array("Template components", json!({ "type": "object" })),
                            json!([]),
                        ),
                    ),
                ],
                &["to", "template_name"],
            ),
            WhatsappTool::SendMedia => json_schema_object(
                &[
                    ("to", json_schema_string("Recipient phone number with country code")),
                    (
                        "media_type",
                        json_schema_enum(
                            "Type of media",
                            &["image", "video", "document", "audio"],
                        ),
                    ),
                    ("media_url", json_schema_string("URL of the media file")),
                    ("caption", json_schema_string("Caption for the media")),
                    ("filename", json_schema_string("Filename (for documents)")),
                ],
                &["to", "media_type", "media_url"],
            ),
            WhatsappTool::GetMessageTemplates => json_schema_object(
                &[(
                    "limit",
                    with_default(
                        json_schema_number("Number of templates to retrieve"),
                        json!(20),
                    ),
                )],
                &[],
            ),
            WhatsappTool::CreateTemplate => json_schema_object(
                &[
                    ("name", json_schema_string("Template name")),
                    (
                        "category",
                        json_schema_enum(
                            "Template category",
                            &["AUTHENTICATION", "MARKETING", "UTILITY"],
                        ),
                    ),
                    (
                        "language",
                        with_default(json_schema_string("Language code"), json!("en_US")),
                    ),
                    (
                        "components",
                        json_schema_array(
                            "Template components (header, body, footer, buttons)",
                            json!({ "type": "object" }),
                        ),
                    ),
                ],
                &["name", "category", "components"],
            ),
            WhatsappTool::GetWebhookInfo | WhatsappTool::GetPhoneNumbers => {
                json_schema_object(&[], &[])
            }
            WhatsappTool::MarkAsRead => json_schema_object(
                &[(
                    "message_id",
                    json_schema_string("WhatsApp message ID to mark as read"),
                )],
                &["message_id"],
            ),
        };
        Tool::new(self.name(), description, schema)
    }

    pub async fn execute(
        &self,
        api: &dyn WhatsappApi,
        webhook: &WebhookSettings,
        arguments: Value,
    ) -> anyhow::Result<CallToolResult> {
        match self {
            WhatsappTool::SendMessage => {
                let args: SendMessageArgs = parse_args(arguments)?;
                let response = api.send_text(&args.to, &args.message, args.preview_url).await?;
                Ok(CallToolResult::text(format!(
                    "Message sent successfully!\nMessage ID: {}\nTo: {}",
                    message_id(&response)?,
                    args.to
                )))
            }
            WhatsappTool::SendTemplate => {
                let args: SendTemplateArgs = parse_args(arguments)?;
                let response = api
                    .send_template(
                        &args.to,
                        &args.template_name,
                        &args.language_code,
                        &args.components,
                    )
                    .await?;
                Ok(CallToolResult::text(format!(
                    "Template message sent successfully!\nMessage ID: {}\nTemplate: {}\nTo: {}",
                    message_id(&response)?,
                    args.template_name,
                    args.to
                )))
            }
            WhatsappTool::SendMedia => {
                let args: SendMediaArgs = parse_args(arguments)?;
                let response = api
                    .send_media(
                        &args.to,
                        args.media_type.as_str(),
                        &args.media_url,
                        args.caption.as_deref(),
                        args.filename.as_deref(),
                    )
                    .await?;
                Ok(CallToolResult::text(format!(
                    "{} sent successfully!\nMessage ID: {}\nTo: {}",
                    args.media_type.as_str(),
                    message_id(&response)?,
                    args.to
                )))
            }
            WhatsappTool::GetMessageTemplates => {
                let args: TemplateListArgs = parse_args(arguments)?;
                let response = api.list_templates(args.limit.max(1)).await?;
                let templates: Vec<Value> = require_array(&response, "/data")?
                    .iter()
                    .map(|template| {
                        json!({
                            "name": template["name"],
                            "status": template["status"],
                            "category": template["category"],
                            "language": template["language"],
                            "components": template["components"],
                        })
                    })
                    .collect();
                Ok(CallToolResult::text(format!(
                    "Found {} templates:\n\n{}",
                    templates.len(),
                    serde_json::to_string_pretty(&templates)?
                )))
            }
            WhatsappTool::CreateTemplate => {
                let args: CreateTemplateArgs = parse_args(arguments)?;
                let response = api
                    .create_template(
                        &args.name,
                        args.category.as_str(),
                        &args.language,
                        &args.components,
                    )
                    .await?;
                Ok(CallToolResult::text(format!(
                    "Template created successfully!\nTemplate ID: {}\nName: {}\nStatus: {}",
                    require_str(&response, "/id")?,
                    args.name,
                    require_str(&response, "/status")?
                )))
            }
            WhatsappTool::GetWebhookInfo => Ok(CallToolResult::text(webhook_info_text(webhook))),
            WhatsappTool::MarkAsRead => {
                let args: MarkAsReadArgs = parse_args(arguments)?;
                api.mark_as_read(&args.message_id).await?;
                Ok(CallToolResult::text(format!(
                    "Message marked as read!\nMessage ID: {}",
                    args.message_id
                )))
            }
            WhatsappTool::GetPhoneNumbers => {
                let response = api.list_phone_numbers().await?;
                let numbers: Vec<Value> = require_array(&response, "/data")?
                    .iter()
                    .map(|phone| {
                        json!({
                            "id": phone["id"],
                            "display_phone_number": phone["display_phone_number"],
                            "verified_name": phone["verified_name"],
                            "quality_rating": phone["quality_rating"],
                        })
                    })
                    .collect();
                Ok(CallToolResult::text(format!(
                    "WhatsApp Business Phone Numbers:\n\n{}",
                    serde_json::to_string_pretty(&numbers)?
                )))
            }
        }
    }
}

fn message_id(response: &Value) -> anyhow::Result<String> {
    require_str(response, "/messages/0/id")
}

fn require_str(value: &Value, pointer: &str) -> anyhow::Result<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Unexpected response shape: missing {}", pointer))
}

fn require_array<'a>(value: &'a Value, pointer: &str) -> anyhow::Result<&'a Vec<Value>> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Unexpected response shape: missing {}", pointer))
}

fn webhook_info_text(webhook: &WebhookSettings) -> String {
    format!(
        "WhatsApp Webhook Configuration:\n\
         \n\
         1. Webhook URL: {url}\n\
         2. Webhook Verify Token: {token}\n\
         \n\
         To receive messages, configure these in Meta Developer Console:\n\
         - Go to your app dashboard\n\
         - Navigate to WhatsApp > Configuration\n\
         - Set Callback URL: {url}\n\
         - Set Verify Token: {token}\n\
         - Subscribe to webhook fields: messages, message_status",
        url = webhook.url,
        token = webhook.verify_token,
    )
}

pub struct WhatsappToolSet {
    catalog: ToolCatalog,
    api: Arc<dyn WhatsappApi>,
    webhook: WebhookSettings,
}

impl WhatsappToolSet {
    pub fn new(api: Arc<dyn WhatsappApi>, webhook: WebhookSettings) -> Self {
        let catalog =
            ToolCatalog::new(WhatsappTool::ALL.iter().map(|tool| tool.descriptor()).collect());
        Self { catalog, api, webhook }
    }
}

#[async_trait]
impl ToolSet for WhatsappToolSet {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = WhatsappTool::from_name(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };
        match tool.execute(self.api.as_ref(), &self.webhook, arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{WhatsappError, WhatsappResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockWhatsapp {
        calls: Mutex<Vec<(String, Value)>>,
        fail_with: Mutex<Option<String>>,
    }

    impl MockWhatsapp {
        fn record(&self, method: &str, args: Value) -> WhatsappResult<()> {
            self.calls.lock().unwrap().push((method.to_string(), args));
            if let Some(message) = self.fail_with.lock().unwrap().clone() {
                return Err(WhatsappError::Api { status: 400, message });
            }
            Ok(())
        }

        fn sent_message() -> Value {
            json!({ "messaging_product": "whatsapp", "messages": [{ "id": "wamid.TEST" }] })
        }
    }

    #[async_trait]
    impl WhatsappApi for MockWhatsapp {
        async fn send_text(
            &self,
            to: &str,
            body: &str,
            preview_url: bool,
        ) -> WhatsappResult<Value> {
            self.record(
                "send_text",
                json!({ "to": to, "body": body, "preview_url": preview_url }),
            )?;
            Ok(Self::sent_message())
        }

        async fn send_template(
            &self,
            to: &str,
            template_name: &str,
            language_code: &str,
            components: &[Value],
        ) -> WhatsappResult<Value> {
            self.record(
                "send_template",
                json!({
                    "to": to,
                    "template_name": template_name,
                    "language_code": language_code,
                    "components": components,
                }),
            )?;
            Ok(Self::sent_message())
        }

        async fn send_media(
            &self,
            to: &str,
            media_type: &str,
            media_url: &str,
            caption: Option<&str>,
            filename: Option<&str>,
        ) -> WhatsappResult<Value> {
            self.record(
                "send_media",
                json!({
                    "to": to,
                    "media_type": media_type,
                    "media_url": media_url,
                    "caption": caption,
                    "filename": filename,
                }),
            )?;
            Ok(Self::sent_message())
        }

        async fn mark_as_read(&self, message_id: &str) -> WhatsappResult<Value> {
            self.record("mark_as_read", json!({ "message_id": message_id }))?;
            Ok(json!({ "success": true }))
        }

        async fn list_templates(&self, limit: u32) -> WhatsappResult<Value> {
            self.record("list_templates", json!({ "limit": limit }))?;
            Ok(json!({
                "data": [{
                    "id": "1234567890",
                    "name": "order_update",
                    "status": "APPROVED",
                    "category": "UTILITY",
                    "language": "en_US",
                    "components": [],
                }]
            }))
        }

        async fn create_template(
            &self,
            name: &str,
            category: &str,
            language: &str,
            components: &[Value],
        ) -> WhatsappResult<Value> {
            self.record(
                "create_template",
                json!({
                    "name": name,
                    "category": category,
                    "language": language,
                    "components": components,
                }),
            )?;
            Ok(json!({ "id": "tmpl-1", "status": "PENDING" }))
        }

        async fn list_phone_numbers(&self) -> WhatsappResult<Value> {
            self.record("list_phone_numbers", json!({}))?;
            Ok(json!({
                "data": [{
                    "id": "1055512345",
                    "display_phone_number": "+353 85 123 4567",
                    "verified_name": "Softcroft",
                    "quality_rating": "GREEN",
                    "platform_type": "CLOUD_API",
                }]
            }))
        }
    }

    fn tool_set() -> (Arc<MockWhatsapp>, WhatsappToolSet) {
        let api = Arc::new(MockWhatsapp::default());
        let webhook = WebhookSettings {
            url: "https://example.com/webhook/whatsapp".to_string(),
            verify_token: "verify-me".to_string(),
        };
        let set = WhatsappToolSet::new(api.clone(), webhook);
        (api, set)
    }

    #[test]
    fn every_catalog_entry_dispatches() {
        let (_, set) = tool_set();
        assert_eq!(set.catalog().len(), WhatsappTool::ALL.len());
        for tool in set.catalog().tools() {
            assert!(WhatsappTool::from_name(&tool.name).is_some());
        }
    }

    #[tokio::test]
    async fn send_message_formats_the_confirmation() {
        let (api, set) = tool_set();

        let result = set
            .call("send_message", json!({ "to": "353851234567", "message": "hello" }))
            .await;

        assert!(!result.is_error);
        assert_eq!(
            result.first_text(),
            "Message sent successfully!\nMessage ID: wamid.TEST\nTo: 353851234567"
        );

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, "send_text");
        assert_eq!(
            calls[0].1,
            json!({ "to": "353851234567", "body": "hello", "preview_url": false })
        );
    }

    #[tokio::test]
    async fn send_template_defaults_language_and_components() {
        let (api, set) = tool_set();

        let result = set
            .call(
                "send_template",
                json!({ "to": "353851234567", "template_name": "order_update" }),
            )
            .await;

        assert!(!result.is_error);
        assert!(result.first_text().starts_with("Template message sent successfully!"));
        assert!(result.first_text().contains("Template: order_update"));

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1["language_code"], "en_US");
        assert_eq!(calls[0].1["components"], json!([]));
    }

    #[tokio::test]
    async fn send_media_passes_the_validated_type() {
        let (api, set) = tool_set();

        let result = set
            .call(
                "send_media",
                json!({
                    "to": "353851234567",
                    "media_type": "document",
                    "media_url": "https://example.com/q.pdf",
                    "filename": "quote.pdf",
                }),
            )
            .await;

        assert!(!result.is_error);
        assert!(result.first_text().starts_with("document sent successfully!"));

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1["media_type"], "document");
        assert_eq!(calls[0].1["filename"], "quote.pdf");
    }

    #[tokio::test]
    async fn send_media_rejects_unknown_media_types() {
        let (api, set) = tool_set();

        let result = set
            .call(
                "send_media",
                json!({
                    "to": "353851234567",
                    "media_type": "sticker",
                    "media_url": "https://example.com/s.webp",
                }),
            )
            .await;

        assert!(result.is_error);
        assert!(result.first_text().starts_with("Error: Invalid arguments:"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn template_listing_projects_the_catalog_fields() {
        let (api, set) = tool_set();

        let result = set.call("get_message_templates", json!({})).await;

        assert!(!result.is_error);
        let text = result.first_text();
        assert!(text.starts_with("Found 1 templates:"));
        assert!(text.contains("order_update"));
        // the projection keeps the five documented fields only
        assert!(!text.contains("1234567890"));

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1, json!({ "limit": 20 }));
    }

    #[tokio::test]
    async fn create_template_reports_id_and_status() {
        let (_, set) = tool_set();

        let result = set
            .call(
                "create_template",
                json!({
                    "name": "promo_may",
                    "category": "MARKETING",
                    "components": [{ "type": "BODY", "text": "Hi {{1}}" }],
                }),
            )
            .await;

        assert!(!result.is_error);
        assert_eq!(
            result.first_text(),
            "Template created successfully!\nTemplate ID: tmpl-1\nName: promo_may\nStatus: PENDING"
        );
    }

    #[tokio::test]
    async fn webhook_info_is_served_without_backend_calls() {
        let (api, set) = tool_set();

        let result = set.call("get_webhook_info", json!({})).await;

        assert!(!result.is_error);
        let text = result.first_text();
        assert!(text.contains("Webhook URL: https://example.com/webhook/whatsapp"));
        assert!(text.contains("Webhook Verify Token: verify-me"));
        assert!(text.contains("messages, message_status"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_as_read_echoes_the_message_id() {
        let (api, set) = tool_set();

        let result = set.call("mark_as_read", json!({ "message_id": "wamid.IN" })).await;

        assert!(!result.is_error);
        assert_eq!(
            result.first_text(),
            "Message marked as read!\nMessage ID: wamid.IN"
        );
        assert_eq!(api.calls.lock().unwrap()[0].0, "mark_as_read");
    }

    #[tokio::test]
    async fn phone_numbers_project_the_documented_fields() {
        let (_, set) = tool_set();

        let result = set.call("get_phone_numbers", json!({})).await;

        assert!(!result.is_error);
        let text = result.first_text();
        assert!(text.starts_with("WhatsApp Business Phone Numbers:"));
        assert!(text.contains("+353 85 123 4567"));
        assert!(!text.contains("CLOUD_API"));
    }

    #[tokio::test]
    async fn unknown_tool_returns_error_without_touching_backend() {
        let (api, set) = tool_set();

        let result = set.call("send_location", json!({})).await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), "Error: Unknown tool: send_location");
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_failure_becomes_error_result_and_server_survives() {
        let (api, set) = tool_set();
        *api.fail_with.lock().unwrap() = Some(
            "Request failed with status code 401\n{\n  \"error\": {\n    \"type\": \"OAuthException\"\n  }\n}".to_string(),
        );

        let result = set
            .call("send_message", json!({ "to": "353851234567", "message": "hello" }))
            .await;
        assert!(result.is_error);
        assert!(result.first_text().starts_with("Error: Request failed with status code 401"));
        assert!(result.first_text().contains("OAuthException"));

        *api.fail_with.lock().unwrap() = None;
        let ok = set.call("get_phone_numbers", json!({})).await;
        assert!(!ok.is_error);
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_backend() {
        let (api, set) = tool_set();

        let missing = set.call("send_message", json!({ "to": "353851234567" })).await;
        assert!(missing.is_error);
        assert!(missing.first_text().starts_with("Error: Invalid arguments:"));

        let stringy = set.call("get_message_templates", json!({ "limit": "ten" })).await;
        assert!(stringy.is_error);

        assert!(api.calls.lock().unwrap().is_empty());
    }
}
