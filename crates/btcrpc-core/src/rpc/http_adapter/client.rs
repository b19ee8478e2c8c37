use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::RpcConfig;
use crate::error::{ConfigError, RpcError};
use crate::rpc::classify::{classify_embedded, classify_failure};
use crate::rpc::protocol::{RequestEnvelope, Response};
use crate::rpc::{HttpRequest, HttpTransport, JSON_CONTENT_TYPE};

use super::connection::{parse_connection, resolve_auth};
use super::transport::ReqwestTransport;

/// bitcoind JSON-RPC client.
///
/// Each call sends exactly one HTTP request and reports every failure once;
/// nothing is retried or cached. The client is `Send + Sync` and can be
/// shared between tasks as long as the transport can.
pub struct RpcClient {
    transport: Arc<dyn HttpTransport>,
    url: String,
    credentials: Option<(String, String)>,
    protocol_version: Option<String>,
    next_id: AtomicU64,
}

/// A 2xx reply whose envelope decoded cleanly and carries no error.
struct Exchange {
    status: StatusCode,
    body: String,
    response: Response<Value>,
}

impl RpcClient {
    /// Create a client backed by [`ReqwestTransport`].
    ///
    /// Credentials are resolved once here; a cookie file is read at
    /// construction time, not per call.
    pub fn new(config: &RpcConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.connect_timeout, config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that posts through `transport`.
    pub fn with_transport(
        config: &RpcConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ConfigError> {
        let url = parse_connection(&config.url)?;
        let credentials = resolve_auth(&config.auth)?;

        Ok(Self {
            transport,
            url,
            credentials,
            protocol_version: config.protocol_version.clone(),
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and decode its `result` into `R`.
    ///
    /// A `result` that does not fit `R` is a
    /// [`ResponseDecode`](crate::ErrorKind::ResponseDecode) error carrying
    /// the raw body; it is never replaced by a default.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<R, RpcError> {
        let Exchange {
            status,
            body,
            response,
        } = self.exchange(method, params).await?;
        response.decode_result().map_err(|e| {
            debug!(rpc.method = method, error = %e, "rpc result does not fit expected shape");
            RpcError::response_decode(status, body, e)
        })
    }

    /// Call `method` and return the whole response envelope.
    pub async fn call_response(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Response<Value>, RpcError> {
        self.exchange(method, params)
            .await
            .map(|exchange| exchange.response)
    }

    async fn exchange(&self, method: &str, params: Vec<Value>) -> Result<Exchange, RpcError> {
        if method.is_empty() {
            return Err(RpcError::invalid_parameter("method name must not be empty"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let body = RequestEnvelope::new(method, params)
            .with_version(self.protocol_version.as_deref())
            .with_id(id)
            .to_body()?;

        let request = HttpRequest {
            url: self.url.clone(),
            body,
            content_type: JSON_CONTENT_TYPE,
            credentials: self.credentials.clone(),
        };
        let response = self.transport.post(request).await.map_err(|e| {
            debug!(rpc.id = id, rpc.method = method, error = %e, "rpc transport failure");
            let status = e.status();
            RpcError::transport(e).with_status(status)
        })?;

        let status = response.status;
        let body = response.body;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        if !status.is_success() {
            return Err(classify_failure(status, body));
        }

        let response: Response<Value> = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(e) => {
                debug!(rpc.id = id, rpc.method = method, error = %e, "undecodable rpc response");
                return Err(RpcError::response_decode(status, body, e));
            }
        };
        if let Some(info) = response.error_info().cloned() {
            return Err(classify_embedded(status, info, body));
        }

        Ok(Exchange {
            status,
            body,
            response,
        })
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
