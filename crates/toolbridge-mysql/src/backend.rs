use crate::error::{MysqlError, MysqlResult};
use crate::rows::convert_row;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::{MySql, Pool};
use tracing::debug;

/// Seam between tool handlers and the database, so tests can swap in a mock.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run a parameterized query and return the result rows as JSON objects.
    async fn query(&self, sql: &str, params: &[Value]) -> MysqlResult<Vec<Value>>;

    /// Close the underlying pool. Idempotent.
    async fn close(&self);
}

/// Pool-backed implementation of [`QueryBackend`].
#[derive(Clone)]
pub struct MysqlBackend {
    pool: Pool<MySql>,
}

impl MysqlBackend {
    pub async fn connect(connection: &crate::connection::MysqlConnection) -> MysqlResult<Self> {
        let pool = connection.create_pool().await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryBackend for MysqlBackend {
    async fn query(&self, sql: &str, params: &[Value]) -> MysqlResult<Vec<Value>> {
        debug!("Executing query with {} parameters", params.len());
        let mut query = sqlx::query(sql);
        for value in params {
            query = bind_value(query, value)?;
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            results.push(convert_row(row)?);
        }
        Ok(results)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> MysqlResult<sqlx::query::Query<'q, MySql, MySqlArguments>> {
    use sqlx::types::Json;

    let query = match value {
        Value::Null => query.bind::<Option<String>>(None),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(num) => {
            if let Some(v) = num.as_i64() {
                query.bind(v)
            } else if let Some(v) = num.as_u64() {
                query.bind(v)
            } else if let Some(v) = num.as_f64() {
                query.bind(v)
            } else {
                return Err(MysqlError::Validation("Unsupported numeric value".to_string()));
            }
        }
        Value::String(text) => query.bind(text.clone()),
        Value::Array(_) | Value::Object(_) => query.bind(Json(value.clone())),
    };

    Ok(query)
}
