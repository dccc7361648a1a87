//! Tool catalog and dispatch for the Sage MSSQL server.

use crate::client::QueryBackend;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolbridge_mcp::protocol::{json_schema_object, json_schema_string};
use toolbridge_mcp::{parse_args, CallToolResult, Tool, ToolCatalog, ToolSet};

const LIST_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
     FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_SCHEMA, TABLE_NAME";
const DESCRIBE_TABLE_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, \
     IS_NULLABLE, COLUMN_DEFAULT \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = @P1 \
     ORDER BY ORDINAL_POSITION";

#[derive(Debug, Deserialize)]
struct QueryArgs {
    sql: String,
}

#[derive(Debug, Deserialize)]
struct DescribeTableArgs {
    table_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SageTool {
    Query,
    ListTables,
    DescribeTable,
}

impl SageTool {
    pub const ALL: [SageTool; 3] =
        [SageTool::Query, SageTool::ListTables, SageTool::DescribeTable];

    pub fn name(&self) -> &'static str {
        match self {
            SageTool::Query => "query",
            SageTool::ListTables => "list_tables",
            SageTool::DescribeTable => "describe_table",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|tool| tool.name() == name).copied()
    }

    pub fn descriptor(&self) -> Tool {
        let description = match self {
            SageTool::Query => "Run a read-only SQL query against the MSSQL database",
            SageTool::ListTables => "List all tables in the database",
            SageTool::DescribeTable => "Get the schema information for a specific table",
        };
        let schema = match self {
            SageTool::Query => json_schema_object(
                &[("sql", json_schema_string("The SQL query to execute (read-only)"))],
                &["sql"],
            ),
            SageTool::ListTables => json_schema_object(&[], &[]),
            SageTool::DescribeTable => json_schema_object(
                &[("table_name", json_schema_string("The name of the table to describe"))],
                &["table_name"],
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
            SageTool::Query => {
                let args: QueryArgs = parse_args(arguments)?;
                ensure_read_only(&args.sql)?;
                backend.query(&args.sql, &[]).await?
            }
            SageTool::ListTables => backend.query(LIST_TABLES_SQL, &[]).await?,
            SageTool::DescribeTable => {
                let args: DescribeTableArgs = parse_args(arguments)?;
                backend.query(DESCRIBE_TABLE_SQL, &[json!(args.table_name)]).await?
            }
        };
        Ok(CallToolResult::json(&Value::Array(rows)))
    }
}

/// Reject anything but SELECT/WITH/SHOW before it reaches the database.
fn ensure_read_only(sql: &str) -> anyhow::Result<()> {
    let statement = sql.trim().to_uppercase();
    let allowed = statement.starts_with("SELECT")
        || statement.starts_with("WITH")
        || statement.starts_with("SHOW");
    if !allowed {
        anyhow::bail!("Only SELECT queries are allowed");
    }
    Ok(())
}

pub struct SageToolSet {
    catalog: ToolCatalog,
    backend: Arc<dyn QueryBackend>,
}

impl SageToolSet {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        let catalog =
            ToolCatalog::new(SageTool::ALL.iter().map(|tool| tool.descriptor()).collect());
        Self { catalog, backend }
    }
}

#[async_trait]
impl ToolSet for SageToolSet {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = SageTool::from_name(name) else {
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };
        match tool.execute(self.backend.as_ref(), arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }
}
