//! HTTP transport seam.
//!
//! DESIGN
//! ======
//! `ApiClient` talks to the network only through [`HttpTransport`], so the
//! session and domain stores can be exercised in tests against a scripted
//! transport. [`ReqwestTransport`] is the production implementation.

use std::time::Duration;

pub use reqwest::Method;

use super::error::TransportError;

/// A fully-resolved outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value for `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the response, whatever its status.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait HttpTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if the client cannot be constructed.
    #[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let builder = reqwest::Client::builder();
        // The browser fetch backend has no client-level timeouts.
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(request_timeout).connect_timeout(connect_timeout);
        let http = builder.build().map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { http })
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
