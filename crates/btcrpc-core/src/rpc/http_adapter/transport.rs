use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, redirect};

use crate::error::ConfigError;
use crate::rpc::{HttpRequest, HttpResponse, HttpTransport, TransportFailure};

/// [`HttpTransport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client that never follows redirects, so every call is exactly
    /// one HTTP request and a 3xx reaches the classifier as-is.
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .tcp_nodelay(true)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { client })
    }

    /// Wrap a caller-built client as-is.
    ///
    /// Its redirect policy is used unchanged; build it with
    /// `redirect::Policy::none()` to keep the one-request-per-call contract.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(header::CONTENT_TYPE, request.content_type)
            .body(request.body);
        if let Some((ref user, ref pass)) = request.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::from(e).with_status(status))?;

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            headers,
        })
    }
}
