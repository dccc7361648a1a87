//! Tool catalog and dispatch for the Tikkurila paint-mixing server.
//!
//! The seven fixed-table tools always read database 1; `execute_query`
//! selects a database explicitly and anything other than 1 or 2 is rejected
//! before a pool is touched.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolbridge_mcp::protocol::{json_schema_array, json_schema_object, json_schema_string};
use toolbridge_mcp::{parse_args, CallToolResult, Tool, ToolCatalog, ToolSet};
use toolbridge_mysql::QueryBackend;

#[derive(Debug, Deserialize)]
struct ExecuteQueryArgs {
    database: u32,
    query: String,
    #[serde(default)]
    params: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TikkurilaTool {
    BasePaints,
    Cans,
    CanSizes,
    CardInZones,
    ColorNames,
    ColorCards,
    Products,
    ExecuteQuery,
}

impl TikkurilaTool {
    pub const ALL: [TikkurilaTool; 8] = [
        TikkurilaTool::BasePaints,
        TikkurilaTool::Cans,
        TikkurilaTool::CanSizes,
        TikkurilaTool::CardInZones,
        TikkurilaTool::ColorNames,
        TikkurilaTool::ColorCards,
        TikkurilaTool::Products,
        TikkurilaTool::ExecuteQuery,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TikkurilaTool::BasePaints => "get_base_paints",
            TikkurilaTool::Cans => "get_cans",
            TikkurilaTool::CanSizes => "get_can_sizes",
            TikkurilaTool::CardInZones => "get_card_in_zones",
            TikkurilaTool::ColorNames => "get_color_names",
            TikkurilaTool::ColorCards => "get_color_cards",
            TikkurilaTool::Products => "get_products",
            TikkurilaTool::ExecuteQuery => "execute_query",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|tool| tool.name() == name).copied()
    }

    pub fn descriptor(&self) -> Tool {
        let description = match self {
            TikkurilaTool::BasePaints => "Retrieves all base paints with their properties.",
            TikkurilaTool::Cans => "Retrieves all can information.",
            TikkurilaTool::CanSizes => "Retrieves all can sizes.",
            TikkurilaTool::CardInZones => "Retrieves all card in zones information.",
            TikkurilaTool::ColorNames => "Retrieves all color names.",
            TikkurilaTool::ColorCards => "Retrieves all color cards.",
            TikkurilaTool::Products => "Retrieves all products.",
            TikkurilaTool::ExecuteQuery => "Executes a custom SQL query on either database.",
        };
        let schema = match self {
            TikkurilaTool::ExecuteQuery => json_schema_object(
                &[
                    (
                        "database",
                        json!({
                            "type": "number",
                            "description": "Which database to query (1 or 2)",
                            "enum": [1, 2],
                        }),
                    ),
                    ("query", json_schema_string("The SQL query to execute.")),
                    (
                        "params",
                        json_schema_array(
                            "An array of parameters for the SQL query.",
                            json!({ "type": ["string", "number", "boolean", "null"] }),
                        ),
                    ),
                ],
                &["database", "query"],
            ),
            _ => json_schema_object(&[], &[]),
        };
        Tool::new(self.name(), description, schema)
    }

    pub async fn execute(
        &self,
        db1: &dyn QueryBackend,
        db2: &dyn QueryBackend,
        arguments: Value,
    ) -> anyhow::Result<CallToolResult> {
        let rows = match self {
            TikkurilaTool::BasePaints => db1.query("SELECT * FROM basepaint", &[]).await?,
            TikkurilaTool::Cans => db1.query("SELECT * FROM can", &[]).await?,
            TikkurilaTool::CanSizes => db1.query("SELECT * FROM cansize", &[]).await?,
            TikkurilaTool::CardInZones => db1.query("SELECT * FROM cardinzone", &[]).await?,
            TikkurilaTool::ColorNames => db1.query("SELECT * FROM colname", &[]).await?,
            TikkurilaTool::ColorCards => db1.query("SELECT * FROM colourcard", &[]).await?,
            TikkurilaTool::Products => db1.query("SELECT * FROM product", &[]).await?,
            TikkurilaTool::ExecuteQuery => {
                let args: ExecuteQueryArgs = parse_args(arguments)?;
                let backend = match args.database {
                    1 => db1,
                    2 => db2,
                    _ => anyhow::bail!("Database must be 1 or 2."),
                };
                backend.query(&args.query, &args.params).await?
            }
        };
        Ok(CallToolResult::json(&Value::Array(rows)))
    }
}

pub struct TikkurilaToolSet {
    catalog: ToolCatalog,
    db1: Arc<dyn QueryBackend>,
    db2: Arc<dyn QueryBackend>,
}

impl TikkurilaToolSet {
    pub fn new(db1: Arc<dyn QueryBackend>, db2: Arc<dyn QueryBackend>) -> Self {
        let catalog =
            ToolCatalog::new(TikkurilaTool::ALL.iter().map(|tool| tool.descriptor()).collect());
        Self { catalog, db1, db2 }
    }
}

#[async_trait]
impl ToolSet for TikkurilaToolSet {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = TikkurilaTool::from_name(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };
        match tool.execute(self.db1.as_ref(), self.db2.as_ref(), arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }
}
