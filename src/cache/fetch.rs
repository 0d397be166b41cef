//! Network tier.

use std::time::Duration;

use bytes::Bytes;

use crate::config::HttpTimeouts;

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("reading response body failed: {0}")]
    Body(String),
}

impl FetchError {
    /// Whether repeating the same request could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ClientBuild(_) => false,
            Self::Request(_) | Self::Body(_) => true,
            Self::Status { status } => *status >= 500 || *status == 408 || *status == 429,
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Source of asset bytes by URL. Enables test doubles for the network.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the full body at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure or a non-success status.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend cannot initialize.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        response.bytes().await.map_err(|e| FetchError::Body(e.to_string()))
    }
}
