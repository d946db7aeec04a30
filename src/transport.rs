//! Request transport seam
//!
//! The workbench never opens connections itself; it hands a fully built
//! [`PreparedRequest`] to a [`Transport`] and records whatever comes back.

use apiscope_document::HttpMethod;
use apiscope_session::ResponseSnapshot;
use async_trait::async_trait;
use indexmap::IndexMap;

/// A request ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,

    /// Absolute or server-relative URL
    pub url: String,

    /// Headers with non-empty values
    pub headers: IndexMap<String, String>,

    /// Body text, absent when the editor was empty
    pub body: Option<String>,
}

/// Transport failures
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request failed: {0}")]
    Failed(String),
}

/// Executes prepared requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request; any HTTP status is a response, not an error
    async fn send(&self, request: PreparedRequest) -> Result<ResponseSnapshot, TransportError>;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use std::time::{Duration, Instant};
    use tracing::debug;

    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// `reqwest`-backed transport
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        pub fn new() -> Result<Self, TransportError> {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("apiscope/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| TransportError::Failed(e.to_string()))?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn send(&self, request: PreparedRequest) -> Result<ResponseSnapshot, TransportError> {
            let url = reqwest::Url::parse(&request.url).map_err(|e| {
                TransportError::InvalidRequest(format!("{}: {}", request.url, e))
            })?;
            let method = reqwest::Method::from_bytes(request.method.to_string().as_bytes())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let mut builder = self.client.request(method, url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            debug!("Sending {} {}", request.method, request.url);
            let started = Instant::now();
            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::Failed(e.to_string()))?;

            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Failed(e.to_string()))?;

            Ok(ResponseSnapshot {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
                duration_ms: started.elapsed().as_millis() as u64,
            })
        }
    }
}
