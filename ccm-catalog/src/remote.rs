//! Remote category service client
//!
//! One operation: fetch the full category list. Connection errors,
//! non-success statuses, and malformed bodies are distinct here but all
//! collapse to "fetch failed" for the reconciliation service, which absorbs
//! them by falling back to the cache.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("ccm/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote client errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Remote service returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the response body
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Category record as returned by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
}

/// Abstract source of remote categories
///
/// The reconciliation service is generic over this seam so tests can script
/// success and failure without a network.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<CategoryDto>, FetchError>;
}

/// HTTP client for the remote category service
pub struct CategoryApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl CategoryApiClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CategorySource for CategoryApiClient {
    async fn fetch_categories(&self) -> Result<Vec<CategoryDto>, FetchError> {
        let url = format!("{}/categories", self.base_url.trim_end_matches('/'));
        debug!(url = %url, "fetching remote categories");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(status.as_u16(), body));
        }

        let categories: Vec<CategoryDto> = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        info!(count = categories.len(), "remote category fetch successful");
        Ok(categories)
    }
}
