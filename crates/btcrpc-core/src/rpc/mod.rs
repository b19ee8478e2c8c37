//! bitcoind JSON-RPC dispatch.
//!
//! [`RpcClient`] builds one request envelope per call, posts it through an
//! [`HttpTransport`], and turns the reply into a typed result or a
//! classified [`RpcError`](crate::RpcError). The production transport is
//! [`ReqwestTransport`]; tests inject their own.

pub mod classify;
mod http_adapter;
mod methods;
#[cfg(test)]
pub mod mock;
pub mod protocol;

pub use classify::{classify, codes, StatusClass};
pub use http_adapter::{ReqwestTransport, RpcClient};
pub use protocol::{ErrorInfo, RequestEnvelope, Response};
pub use reqwest::StatusCode;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::BoxError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One HTTP POST handed to the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub body: String,
    pub content_type: &'static str,
    /// Basic-auth `(user, password)`.
    pub credentials: Option<(String, String)>,
}

/// Whatever HTTP response came back, success or not.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Body decoded as UTF-8; invalid sequences become U+FFFD.
    pub body: String,
    pub headers: HeaderMap,
}

/// No usable HTTP response was obtained: connection refused, timeout, TLS
/// failure, or a body that could not be read after the status arrived.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportFailure {
    message: String,
    status: Option<StatusCode>,
    #[source]
    source: Option<BoxError>,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Record the status line that was received before the failure.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err.status(),
            source: Some(Box::new(err)),
        }
    }
}

/// The HTTP seam of the client.
///
/// Implementations own pooling, TLS and timeouts. They must be safe to
/// share across tasks; the client adds no locking of its own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform exactly one POST. Non-2xx statuses are returned as responses,
    /// not failures.
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}
