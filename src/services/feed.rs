use crate::models::{LocationFeed, LocationRecord};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching the location snapshot
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Feed returned error status: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Supplies the current snapshot of location records
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<LocationRecord>, FeedError>;
}

/// Location feed client
///
/// Reads a JSON document with a top-level `locations` array.
pub struct FeedClient {
    url: String,
    client: Client,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LocationSource for FeedClient {
    async fn fetch_all(&self) -> Result<Vec<LocationRecord>, FeedError> {
        tracing::debug!("Fetching locations from: {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::ApiError(format!(
                "Failed to fetch locations: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let feed: LocationFeed = serde_json::from_str(&body)
            .map_err(|e| FeedError::InvalidResponse(format!("Failed to parse locations: {}", e)))?;

        let total = feed.locations.len();
        let records = feed.into_records();
        tracing::debug!("Fetched {} of {} locations", records.len(), total);
        Ok(records)
    }
}
