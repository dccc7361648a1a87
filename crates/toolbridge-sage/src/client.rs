//! Single-connection MSSQL backend. TDS connections are stateful, so one
//! connection is opened at startup and queries are serialized through a mutex.

use crate::config::SageConfig;
use crate::error::{SageError, SageResult};
use crate::rows::convert_row;
use async_trait::async_trait;
use serde_json::Value;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, ToSql};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// Seam between tool handlers and the database, so tests can swap in a mock.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run a parameterized query and return the result rows as JSON objects.
    async fn query(&self, sql: &str, params: &[Value]) -> SageResult<Vec<Value>>;
}

/// Tiberius-backed implementation of [`QueryBackend`].
pub struct SageClient {
    client: Mutex<Client<Compat<TcpStream>>>,
}

impl SageClient {
    pub async fn connect(config: &SageConfig) -> SageResult<Self> {
        let mut tds = Config::new();
        tds.host(&config.server);
        tds.port(config.port);
        tds.database(&config.database);
        tds.authentication(AuthMethod::sql_server(&config.user, &config.password));
        // The Sage instance serves a self-signed certificate: encrypt, trust it
        tds.encryption(EncryptionLevel::Required);
        tds.trust_cert();

        let tcp = TcpStream::connect(tds.get_addr()).await?;
        tcp.set_nodelay(true)?;
        let client = Client::connect(tds, tcp.compat_write()).await?;
        debug!(server = %config.server, database = %config.database, "connected");

        Ok(Self { client: Mutex::new(client) })
    }
}

#[async_trait]
impl QueryBackend for SageClient {
    async fn query(&self, sql: &str, params: &[Value]) -> SageResult<Vec<Value>> {
        let owned = bind_params(params)?;
        let refs: Vec<&dyn ToSql> = owned.iter().map(|param| param.as_ref()).collect();

        let mut client = self.client.lock().await;
        let rows = client.query(sql, &refs).await?.into_first_result().await?;

        rows.iter().map(convert_row).collect()
    }
}

fn bind_params(params: &[Value]) -> SageResult<Vec<Box<dyn ToSql>>> {
    params
        .iter()
        .map(|value| {
            let param: Box<dyn ToSql> = match value {
                Value::Null => Box::new(Option::<String>::None),
                Value::Bool(flag) => Box::new(*flag),
                Value::Number(num) => {
                    if let Some(v) = num.as_i64() {
                        Box::new(v)
                    } else if let Some(v) = num.as_f64() {
                        Box::new(v)
                    } else {
                        return Err(SageError::Validation(
                            "Unsupported numeric value".to_string(),
                        ));
                    }
                }
                Value::String(text) => Box::new(text.clone()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(SageError::Validation(
                        "Array and object parameters are not supported".to_string(),
                    ))
                }
            };
            Ok(param)
        })
        .collect()
}
