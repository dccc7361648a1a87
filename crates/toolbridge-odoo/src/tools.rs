//! Tool catalog and dispatch for the Odoo server.

use crate::client::OdooApi;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use toolbridge_mcp::protocol::{
    json_schema_array, json_schema_number, json_schema_object, json_schema_object_prop,
    json_schema_string, with_default,
};
use toolbridge_mcp::{parse_args, CallToolResult, Tool, ToolCatalog, ToolSet};

fn default_limit() -> u64 {
    80
}

#[derive(Debug, Deserialize)]
struct SearchReadArgs {
    model: String,
    #[serde(default)]
    domain: Vec<Value>,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(default)]
    offset: u64,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    model: String,
    values: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WriteArgs {
    model: String,
    ids: Vec<i64>,
    values: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct UnlinkArgs {
    model: String,
    ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct FieldsGetArgs {
    model: String,
    #[serde(default)]
    allfields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdooTool {
    SearchRead,
    Create,
    Write,
    Unlink,
    FieldsGet,
}

impl OdooTool {
    pub const ALL: [OdooTool; 5] =
        [OdooTool::SearchRead, OdooTool::Create, OdooTool::Write, OdooTool::Unlink, OdooTool::FieldsGet];

    pub fn name(&self) -> &'static str {
        match self {
            OdooTool::SearchRead => "search_read",
            OdooTool::Create => "create",
            OdooTool::Write => "write",
            OdooTool::Unlink => "unlink",
            OdooTool::FieldsGet => "fields_get",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|tool| tool.name() == name).copied()
    }

    pub fn descriptor(&self) -> Tool {
        match self {
            OdooTool::SearchRead => Tool::new(
                self.name(),
                "Search and read records from Odoo",
                json_schema_object(
                    &[
                        (
                            "model",
                            json_schema_string(
                                "The Odoo model name (e.g., res.partner, sale.order)",
                            ),
                        ),
                        (
                            "domain",
                            with_default(
                                json!({
                                    "type": "array",
                                    "description": "Search domain (e.g., [['customer_rank', '>', 0]])",
                                }),
                                json!([]),
                            ),
                        ),
                        (
                            "fields",
                            with_default(
                                json_schema_array(
                                    "List of fields to return",
                                    json!({ "type": "string" }),
                                ),
                                json!([]),
                            ),
                        ),
                        (
                            "limit",
                            with_default(
                                json_schema_number("Maximum number of records to return"),
                                json!(80),
                            ),
                        ),
                        (
                            "offset",
                            with_default(
                                json_schema_number("Number of records to skip"),
                                json!(0),
                            ),
                        ),
                    ],
                    &["model"],
                ),
            ),
            OdooTool::Create => Tool::new(
                self.name(),
                "Create a new record in Odoo",
                json_schema_object(
                    &[
                        ("model", json_schema_string("The Odoo model name")),
                        ("values", json_schema_object_prop("Field values for the new record")),
                    ],
                    &["model", "values"],
                ),
            ),
            OdooTool::Write => Tool::new(
                self.name(),
                "Update existing records in Odoo",
                json_schema_object(
                    &[
                        ("model", json_schema_string("The Odoo model name")),
                        (
                            "ids",
                            json_schema_array(
                                "IDs of records to update",
                                json!({ "type": "number" }),
                            ),
                        ),
                        ("values", json_schema_object_prop("Field values to update")),
                    ],
                    &["model", "ids", "values"],
                ),
            ),
            OdooTool::Unlink => Tool::new(
                self.name(),
                "Delete records from Odoo",
                json_schema_object(
                    &[
                        ("model", json_schema_string("The Odoo model name")),
                        (
                            "ids",
                            json_schema_array(
                                "IDs of records to delete",
                                json!({ "type": "number" }),
                            ),
                        ),
                    ],
                    &["model", "ids"],
                ),
            ),
            OdooTool::FieldsGet => Tool::new(
                self.name(),
                "Get field definitions for a model",
                json_schema_object(
                    &[
                        ("model", json_schema_string("The Odoo model name")),
                        (
                            "allfields",
                            with_default(
                                json_schema_array(
                                    "Specific fields to get info for (empty for all)",
                                    json!({ "type": "string" }),
                                ),
                                json!([]),
                            ),
                        ),
                    ],
                    &["model"],
                ),
            ),
        }
    }

    pub async fn execute(
        &self,
        api: &dyn OdooApi,
        arguments: Value,
    ) -> anyhow::Result<CallToolResult> {
        let result = match self {
            OdooTool::SearchRead => {
                let args: SearchReadArgs = parse_args(arguments)?;
                // execute_kw takes these positionally: domain, fields,
                // offset, limit
                api.execute_kw(
                    &args.model,
                    "search_read",
                    vec![
                        Value::Array(args.domain),
                        json!(args.fields),
                        json!(args.offset),
                        json!(args.limit.max(1)),
                    ],
                )
                .await?
            }
            OdooTool::Create => {
                let args: CreateArgs = parse_args(arguments)?;
                api.execute_kw(&args.model, "create", vec![Value::Object(args.values)]).await?
            }
            OdooTool::Write => {
                let args: WriteArgs = parse_args(arguments)?;
                api.execute_kw(
                    &args.model,
                    "write",
                    vec![json!(args.ids), Value::Object(args.values)],
                )
                .await?
            }
            OdooTool::Unlink => {
                let args: UnlinkArgs = parse_args(arguments)?;
                api.execute_kw(&args.model, "unlink", vec![json!(args.ids)]).await?
            }
            OdooTool::FieldsGet => {
                let args: FieldsGetArgs = parse_args(arguments)?;
                api.execute_kw(
                    &args.model,
                    "fields_get",
                    vec![
                        json!(args.allfields),
                        json!({ "attributes": ["string", "help", "type", "required"] }),
                    ],
                )
                .await?
            }
        };
        Ok(CallToolResult::json(&result))
    }
}

pub struct OdooToolSet {
    catalog: ToolCatalog,
    api: Arc<dyn OdooApi>,
}

impl OdooToolSet {
    pub fn new(api: Arc<dyn OdooApi>) -> Self {
        let catalog =
            ToolCatalog::new(OdooTool::ALL.iter().map(|tool| tool.descriptor()).collect());
        Self { catalog, api }
    }
}

#[async_trait]
impl ToolSet for OdooToolSet {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = OdooTool::from_name(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };
        match tool.execute(self.api.as_ref(), arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OdooError, OdooResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockOdoo {
        calls: Mutex<Vec<(String, String, Value)>>,
        fault: Mutex<Option<String>>,
    }

    impl MockOdoo {
        fn fail(&self, message: &str) {
            *self.fault.lock().unwrap() = Some(message.to_string());
        }
    }

    #[async_trait]
    impl OdooApi for MockOdoo {
        async fn execute_kw(
            &self,
            model: &str,
            method: &str,
            args: Vec<Value>,
        ) -> OdooResult<Value> {
            self.calls.lock().unwrap().push((
                model.to_string(),
                method.to_string(),
                Value::Array(args),
            ));
            if let Some(message) = self.fault.lock().unwrap().clone() {
                return Err(OdooError::Fault { code: 1, message });
            }
            Ok(json!([{ "id": 1 }]))
        }
    }

    fn tool_set() -> (Arc<MockOdoo>, OdooToolSet) {
        let api = Arc::new(MockOdoo::default());
        let set = OdooToolSet::new(api.clone());
        (api, set)
    }

    #[test]
    fn every_catalog_entry_dispatches() {
        let (_, set) = tool_set();
        assert_eq!(set.catalog().len(), OdooTool::ALL.len());
        for tool in set.catalog().tools() {
            assert!(OdooTool::from_name(&tool.name).is_some());
        }
    }

    #[tokio::test]
    async fn search_read_keeps_positional_argument_order() {
        let (api, set) = tool_set();

        let result = set
            .call(
                "search_read",
                json!({
                    "model": "res.partner",
                    "domain": [["customer_rank", ">", 0]],
                    "fields": ["name", "email"],
                    "limit": 5,
                    "offset": 10,
                }),
            )
            .await;
        assert!(!result.is_error);

        let calls = api.calls.lock().unwrap();
        let (model, method, args) = &calls[0];
        assert_eq!(model, "res.partner");
        assert_eq!(method, "search_read");
        assert_eq!(args, &json!([[["customer_rank", ">", 0]], ["name", "email"], 10, 5]));
    }

    #[tokio::test]
    async fn search_read_defaults_fill_in() {
        let (api, set) = tool_set();

        set.call("search_read", json!({ "model": "res.partner" })).await;

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].2, json!([[], [], 0, 80]));
    }

    #[tokio::test]
    async fn zero_limit_is_clamped_to_one() {
        let (api, set) = tool_set();

        set.call("search_read", json!({ "model": "res.partner", "limit": 0 })).await;

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].2, json!([[], [], 0, 1]));
    }

    #[tokio::test]
    async fn fields_get_requests_the_standard_attributes() {
        let (api, set) = tool_set();

        set.call("fields_get", json!({ "model": "sale.order" })).await;

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1, "fields_get");
        assert_eq!(
            calls[0].2,
            json!([[], { "attributes": ["string", "help", "type", "required"] }])
        );
    }

    #[tokio::test]
    async fn write_sends_ids_then_values() {
        let (api, set) = tool_set();

        set.call(
            "write",
            json!({ "model": "res.partner", "ids": [7, 8], "values": { "active": false } }),
        )
        .await;

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].2, json!([[7, 8], { "active": false }]));
    }

    #[tokio::test]
    async fn unknown_tool_returns_error_without_touching_backend() {
        let (api, set) = tool_set();

        let result = set.call("search_write", json!({})).await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), "Error: Unknown tool: search_write");
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_backend() {
        let (api, set) = tool_set();

        let missing = set.call("create", json!({ "model": "res.partner" })).await;
        assert!(missing.is_error);
        assert!(missing.first_text().starts_with("Error: Invalid arguments:"));

        let negative =
            set.call("search_read", json!({ "model": "res.partner", "limit": -1 })).await;
        assert!(negative.is_error);

        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fault_becomes_error_result_and_dispatcher_survives() {
        let (api, set) = tool_set();
        api.fail("Object res.bogus doesn't exist");

        let result = set.call("unlink", json!({ "model": "res.bogus", "ids": [1] })).await;
        assert!(result.is_error);
        assert!(result.first_text().contains("res.bogus doesn't exist"));

        *api.fault.lock().unwrap() = None;
        let ok = set.call("unlink", json!({ "model": "res.partner", "ids": [1] })).await;
        assert!(!ok.is_error);
    }
}
