//! XML-RPC client for the Odoo external API.

use crate::config::OdooConfig;
use crate::error::{OdooError, OdooResult};
use crate::xmlrpc;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend seam for the tool handlers; the dispatcher only ever needs
/// `execute_kw`.
#[async_trait]
pub trait OdooApi: Send + Sync {
    async fn execute_kw(&self, model: &str, method: &str, args: Vec<Value>) -> OdooResult<Value>;
}

pub struct OdooClient {
    http: reqwest::Client,
    url: String,
    db: String,
    username: String,
    password: String,
    uid: OnceCell<i64>,
}

impl OdooClient {
    pub fn new(config: &OdooConfig) -> OdooResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: config.url.clone(),
            db: config.db.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            uid: OnceCell::new(),
        })
    }

    async fn call(&self, endpoint: &str, method: &str, params: &[Value]) -> OdooResult<Value> {
        let url = format!("{}/xmlrpc/2/{}", self.url, endpoint);
        debug!("POST {} ({})", url, method);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(xmlrpc::encode_call(method, params))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        xmlrpc::parse_response(&body)
    }

    /// Authenticate against the `common` endpoint on first use; the uid is
    /// cached for the lifetime of the process. A bad login comes back as
    /// boolean `false` rather than a fault.
    async fn uid(&self) -> OdooResult<i64> {
        self.uid
            .get_or_try_init(|| async {
                let value = self
                    .call(
                        "common",
                        "authenticate",
                        &[
                            json!(self.db),
                            json!(self.username),
                            json!(self.password),
                            json!({}),
                        ],
                    )
                    .await?;
                let uid =
                    value.as_i64().ok_or_else(|| OdooError::AuthFailed(self.db.clone()))?;
                info!("authenticated against '{}' as uid {}", self.db, uid);
                Ok(uid)
            })
            .await
            .map(|uid| *uid)
    }
}

#[async_trait]
impl OdooApi for OdooClient {
    async fn execute_kw(&self, model: &str, method: &str, args: Vec<Value>) -> OdooResult<Value> {
        let uid = self.uid().await?;
        self.call(
            "object",
            "execute_kw",
            &[
                json!(self.db),
                json!(uid),
                json!(self.password),
                json!(model),
                json!(method),
                Value::Array(args),
            ],
        )
        .await
    }
}
