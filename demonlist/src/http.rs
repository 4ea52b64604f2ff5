//! HTTP client abstraction for testability
//!
//! The loader only ever needs three request shapes: a plain GET, a HEAD, and a
//! GET limited to a byte range. Unlike a typical download client, non-success
//! statuses are returned as ordinary responses because callers report the
//! status code upward. Only failures that produce no response at all become a
//! [`TransportError`].

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::header::RANGE;
use thiserror::Error;

use crate::config::DemonlistConfig;

/// Default timeout for list requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("IntegratedDemonlist/", env!("CARGO_PKG_VERSION"));

/// Errors for requests that never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// Connecting or sending the request failed.
    #[error("request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The response body could not be read.
    #[error("failed to read response from {url}: {reason}")]
    BodyFailed { url: String, reason: String },
}

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

/// A single outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Inclusive byte range sent as a `Range` header.
    pub range: Option<(u64, u64)>,
}

impl HttpRequest {
    /// Creates a GET request for the whole resource.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            range: None,
        }
    }

    /// Creates a HEAD request.
    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::Head,
            url: url.into(),
            range: None,
        }
    }

    /// Restricts the request to the inclusive byte range `start..=end`.
    pub fn with_range(mut self, start: u64, end: u64) -> Self {
        self.range = Some((start, end));
        self
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Sends a request and resolves once the full body has arrived.
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Creates a client using the timeout and user agent from `config`.
    pub fn from_config(config: &DemonlistConfig) -> Result<Self, TransportError> {
        Self::with_settings(config.timeout, &config.user_agent)
    }

    /// Creates a new ReqwestClient with custom timeout and user agent.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Head => self.client.head(&request.url),
            };
            if let Some((start, end)) = request.range {
                builder = builder.header(RANGE, format!("bytes={}-{}", start, end));
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::RequestFailed {
                    url: request.url.clone(),
                    reason: e.to_string(),
                })?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::BodyFailed {
                    url: request.url.clone(),
                    reason: e.to_string(),
                })?;

            Ok(HttpResponse { status, body })
        })
    }
}
