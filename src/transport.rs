//! Transport seam between the SDK and a Gateway
//!
//! The orchestrator only ever talks to [`GatewayTransport`]; callers inject
//! whatever fits their environment. [`HttpTransport`] is the bundled
//! reqwest-backed implementation for callers without a bespoke stack.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, SiwfError};

/// Default request timeout of the bundled HTTP transport
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method of a Gateway request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buffered Gateway response: the status plus the full body.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| SiwfError::InvalidGatewayResponse(e.to_string()))
    }

    /// The body as lossy UTF-8, for error reporting.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Externally supplied transport to a Gateway.
///
/// `path` is relative to the Gateway base; implementations own the base
/// URL, headers, and authentication. A returned error means the request
/// could not complete at all; HTTP-level failures come back as a
/// [`GatewayResponse`] with the failing status.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn fetch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<GatewayResponse>;
}

/// Configuration for the bundled HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Gateway base URL, e.g. `https://gateway.example.net`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Reqwest-backed [`GatewayTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from its configuration.
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn fetch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<GatewayResponse> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Gateway request");

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => match &body {
                Some(json) => self.client.post(&url).json(json),
                None => self.client.post(&url),
            },
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(method = %method, url = %url, status, "Gateway response");
        Ok(GatewayResponse::new(status, bytes.to_vec()))
    }
}
