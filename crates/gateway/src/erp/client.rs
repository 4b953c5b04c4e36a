//! ERP JSON-RPC client: transport, session handling, `execute_kw`.
//!
//! Every call is a `POST {base}/jsonrpc` with a JSON-RPC 2.0 envelope. The
//! `common` service answers version pings and authentication; everything else
//! goes through the `object` service's `execute_kw`, which needs the session
//! uid obtained from `authenticate`. The uid is resolved once on first use
//! and cached for the life of the client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{ErpError, types::ServerVersion};
use crate::config::ErpConfig;

/// Request timeout for ERP calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Capacity of the country-name lookup cache.
const COUNTRY_CACHE_CAPACITY: u64 = 256;

/// ERP JSON-RPC client.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct ErpClient {
    pub(super) inner: Arc<ErpClientInner>,
}

pub(super) struct ErpClientInner {
    client: reqwest::Client,
    endpoint: url::Url,
    database: String,
    username: String,
    password: SecretString,
    /// Session uid, resolved on first use.
    uid: RwLock<Option<i64>>,
    /// Monotonic JSON-RPC request id.
    call_id: AtomicU64,
    /// Country-name → country-id lookup cache (`None` caches misses too).
    pub(super) country_cache: Cache<String, Option<i32>>,
}

impl std::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("database", &self.inner.database)
            .field("username", &self.inner.username)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// JSON-RPC response envelope.
#[derive(Debug, serde::Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcFailure>,
}

#[derive(Debug, serde::Deserialize)]
struct RpcFailure {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<RpcFailureData>,
}

#[derive(Debug, serde::Deserialize)]
struct RpcFailureData {
    message: Option<String>,
}

impl ErpClient {
    /// Create a new client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &ErpConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let mut endpoint = config.url.clone();
        endpoint.set_path("/jsonrpc");

        Self {
            inner: Arc::new(ErpClientInner {
                client,
                endpoint,
                database: config.database.clone(),
                username: config.username.clone(),
                password: config.password.clone(),
                uid: RwLock::new(None),
                call_id: AtomicU64::new(1),
                country_cache: Cache::new(COUNTRY_CACHE_CAPACITY),
            }),
        }
    }

    // =========================================================================
    // Common service
    // =========================================================================

    /// Ping the server, returning its version info. Used for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the server is unreachable or answers strangely.
    #[instrument(skip(self))]
    pub async fn version(&self) -> Result<ServerVersion, ErpError> {
        let result = self.rpc_call("common", "version", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| ErpError::UnexpectedResponse(format!("version: {e}")))
    }

    /// Authenticate and return the session uid.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::AuthenticationFailed` if the ERP rejects the
    /// configured credentials.
    #[instrument(skip(self), fields(username = %self.inner.username))]
    pub async fn authenticate(&self) -> Result<i64, ErpError> {
        let args = json!([
            self.inner.database,
            self.inner.username,
            self.inner.password.expose_secret(),
            {}
        ]);

        let result = self.rpc_call("common", "authenticate", args).await?;

        // A rejected login comes back as `false`, not an error object
        let uid = result.as_i64().ok_or(ErpError::AuthenticationFailed)?;
        if uid <= 0 {
            return Err(ErpError::AuthenticationFailed);
        }

        *self.inner.uid.write().await = Some(uid);
        debug!(uid, "ERP session established");

        Ok(uid)
    }

    /// Return the cached session uid, authenticating on first use.
    async fn ensure_session(&self) -> Result<i64, ErpError> {
        if let Some(uid) = *self.inner.uid.read().await {
            return Ok(uid);
        }
        self.authenticate().await
    }

    // =========================================================================
    // Object service
    // =========================================================================

    /// Run `method` on `model` through the object service.
    ///
    /// `args` must be a JSON array (positional arguments); `kwargs` a JSON
    /// object (keyword arguments, including `context` when needed).
    ///
    /// # Errors
    ///
    /// Returns `ErpError` on transport failure, an RPC error from the server,
    /// or a result that does not deserialize to `T`.
    #[instrument(skip(self, args, kwargs), fields(model = %model, method = %method))]
    pub async fn execute_kw<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<T, ErpError> {
        let uid = self.ensure_session().await?;

        let call_args = json!([
            self.inner.database,
            uid,
            self.inner.password.expose_secret(),
            model,
            method,
            args,
            kwargs
        ]);

        let result = self.rpc_call("object", "execute_kw", call_args).await?;
        serde_json::from_value(result)
            .map_err(|e| ErpError::UnexpectedResponse(format!("{model}.{method}: {e}")))
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn rpc_call(
        &self,
        service: &str,
        method: &str,
        args: Value,
    ) -> Result<Value, ErpError> {
        let id = self.inner.call_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "service": service,
                "method": method,
                "args": args,
            },
            "id": id,
        });

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let envelope: RpcResponse = response.json().await?;

        if let Some(failure) = envelope.error {
            // The server-side message is usually buried in error.data
            let message = failure
                .data
                .and_then(|d| d.message)
                .unwrap_or(failure.message);
            return Err(ErpError::Rpc {
                code: failure.code,
                message,
            });
        }

        envelope
            .result
            .ok_or_else(|| ErpError::UnexpectedResponse("missing result".to_string()))
    }
}
