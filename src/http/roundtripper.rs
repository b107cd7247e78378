//! Request/response exchange against the implementation under test
//!
//! The default implementation goes straight at the gateway address with
//! reqwest and, in debug mode, dumps each exchange.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Method;
use thiserror::Error;
use tracing::{debug, info};

/// Round-trip errors
#[derive(Error, Debug)]
pub enum RoundTripError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
}

/// A request to send through the gateway.
#[derive(Clone, Debug)]
pub struct Request {
    pub url: String,
    pub method: String,
    /// Host header override, for hostname-based routing.
    pub host: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            host: None,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The captured response.
#[derive(Clone, Debug)]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub duration_ms: u64,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Look up a response header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }

    pub fn body_contains(&self, needle: &str) -> bool {
        self.body.contains(needle)
    }
}

/// Performs one HTTP exchange. Swappable so suites can substitute their own
/// transport (for example, one tunnelled through a bastion).
pub trait RoundTripper: Send + Sync {
    fn capture_round_trip<'a>(&'a self, request: Request) -> BoxFuture<'a, Result<Response>>;
}

/// Direct round-tripper used unless the suite overrides it.
pub struct DefaultRoundTripper {
    client: reqwest::Client,
    debug: bool,
    timeout_secs: u64,
}

impl DefaultRoundTripper {
    pub fn new(debug: bool) -> Result<Self> {
        Self::with_timeout(30, debug)
    }

    pub fn with_timeout(timeout_secs: u64, debug: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            debug,
            timeout_secs,
        })
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| RoundTripError::InvalidMethod(request.method.clone()))?;

        if self.debug {
            info!("Sending {} request to {}", request.method, request.url);
        } else {
            debug!("Sending {} request to {}", request.method, request.url);
        }

        let mut builder = self.client.request(method, &request.url);

        if let Some(host) = &request.host {
            builder = builder.header("Host", host);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let url = request.url.clone();

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow::anyhow!(RoundTripError::Timeout(self.timeout_secs))
            } else if e.is_connect() {
                anyhow::anyhow!(RoundTripError::ConnectionRefused(url.clone()))
            } else {
                anyhow::anyhow!(RoundTripError::RequestFailed(e.to_string()))
            }
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(key.to_string().to_lowercase(), value.to_string());
            }
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if self.debug {
            info!(
                "Received status {} in {}ms ({} byte body)",
                status.as_u16(),
                duration_ms,
                body.len()
            );
        } else {
            debug!("Received status {} in {}ms", status.as_u16(), duration_ms);
        }

        Ok(Response {
            status_code: status.as_u16(),
            headers,
            body,
            duration_ms,
        })
    }
}

impl RoundTripper for DefaultRoundTripper {
    fn capture_round_trip<'a>(&'a self, request: Request) -> BoxFuture<'a, Result<Response>> {
        self.send(request).boxed()
    }
}
