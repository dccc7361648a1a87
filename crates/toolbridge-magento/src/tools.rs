//! Tool catalog and dispatch for the Magento paint-colour server.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolbridge_mcp::protocol::{
    json_schema_array, json_schema_number, json_schema_object, json_schema_string,
};
use toolbridge_mcp::{parse_args, CallToolResult, Tool, ToolCatalog, ToolSet};
use toolbridge_mysql::QueryBackend;

const COLOUR_CATEGORIES_SQL: &str = "SELECT * FROM srp_paintcolour_colour_category";
const COLOUR_PRODUCTS_SQL: &str = "SELECT cp.*, cpe.sku, cpev.value AS product_name \
     FROM srp_paintcolour_category_product cp \
     LEFT JOIN catalog_product_entity cpe ON cp.product_id = cpe.entity_id \
     LEFT JOIN catalog_product_entity_varchar cpev ON cpe.entity_id = cpev.entity_id \
     WHERE cpev.attribute_id = 73";
const COLOUR_RANGES_SQL: &str = "SELECT * FROM srp_paintcolour_colour_range";
const PRODUCT_MANAGEMENT_SQL: &str = "SELECT * FROM srp_paintcolour_product_management";
const PRODUCT_ASSIGNMENTS_SQL: &str = "SELECT * FROM srp_product_assign";

#[derive(Debug, Deserialize)]
struct LimitArgs {
    #[serde(default)]
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ExecuteQueryArgs {
    query: String,
    #[serde(default)]
    params: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagentoTool {
    ColourCategories,
    ColourProducts,
    ColourRanges,
    ProductManagement,
    ProductAssignments,
    ExecuteQuery,
}

impl MagentoTool {
    pub const ALL: [MagentoTool; 6] = [
        MagentoTool::ColourCategories,
        MagentoTool::ColourProducts,
        MagentoTool::ColourRanges,
        MagentoTool::ProductManagement,
        MagentoTool::ProductAssignments,
        MagentoTool::ExecuteQuery,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MagentoTool::ColourCategories => "get_colour_categories",
            MagentoTool::ColourProducts => "get_colour_products",
            MagentoTool::ColourRanges => "get_colour_ranges",
            MagentoTool::ProductManagement => "get_product_management",
            MagentoTool::ProductAssignments => "get_product_assignments",
            MagentoTool::ExecuteQuery => "execute_query",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|tool| tool.name() == name).copied()
    }

    pub fn descriptor(&self) -> Tool {
        let description = match self {
            MagentoTool::ColourCategories => "Get all colour categories",
            MagentoTool::ColourProducts => "Get all colour products",
            MagentoTool::ColourRanges => "Get all colour ranges",
            MagentoTool::ProductManagement => "Get product management data",
            MagentoTool::ProductAssignments => "Get product assignments",
            MagentoTool::ExecuteQuery => "Execute a custom SQL query",
        };
        let schema = match self {
            MagentoTool::ExecuteQuery => json_schema_object(
                &[
                    ("query", json_schema_string("SQL query to execute")),
                    (
                        "params",
                        json_schema_array(
                            "Query parameters",
                            json!({ "type": ["string", "number", "boolean", "null"] }),
                        ),
                    ),
                ],
                &["query"],
            ),
            _ => json_schema_object(
                &[("limit", json_schema_number("Maximum number of records to return"))],
                &[],
            ),
        };
        Tool::new(self.name(), description, schema)
    }

    pub async fn execute(
        &self,
        backend: &dyn QueryBackend,
        arguments: Value,
    ) -> anyhow::Result<CallToolResult> {
        let rows = match self {
            MagentoTool::ColourCategories => {
                fixed_query(backend, COLOUR_CATEGORIES_SQL, arguments).await?
            }
            MagentoTool::ColourProducts => {
                fixed_query(backend, COLOUR_PRODUCTS_SQL, arguments).await?
            }
            MagentoTool::ColourRanges => {
                fixed_query(backend, COLOUR_RANGES_SQL, arguments).await?
            }
            MagentoTool::ProductManagement => {
                fixed_query(backend, PRODUCT_MANAGEMENT_SQL, arguments).await?
            }
            MagentoTool::ProductAssignments => {
                fixed_query(backend, PRODUCT_ASSIGNMENTS_SQL, arguments).await?
            }
            MagentoTool::ExecuteQuery => {
                let args: ExecuteQueryArgs = parse_args(arguments)?;
                backend.query(&args.query, &args.params).await?
            }
        };
        Ok(CallToolResult::json(&Value::Array(rows)))
    }
}

/// Run a fixed table query, appending ` LIMIT ?` only when a limit was given.
async fn fixed_query(
    backend: &dyn QueryBackend,
    base_sql: &str,
    arguments: Value,
) -> anyhow::Result<Vec<Value>> {
    let args: LimitArgs = parse_args(arguments)?;
    let rows = match args.limit {
        Some(limit) => {
            let sql = format!("{} LIMIT ?", base_sql);
            backend.query(&sql, &[json!(limit.max(1))]).await?
        }
        None => backend.query(base_sql, &[]).await?,
    };
    Ok(rows)
}

pub struct MagentoToolSet {
    catalog: ToolCatalog,
    backend: Arc<dyn QueryBackend>,
}

impl MagentoToolSet {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        let catalog =
            ToolCatalog::new(MagentoTool::ALL.iter().map(|tool| tool.descriptor()).collect());
        Self { catalog, backend }
    }
}

#[async_trait]
impl ToolSet for MagentoToolSet {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = MagentoTool::from_name(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };
        match tool.execute(self.backend.as_ref(), arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }
}
