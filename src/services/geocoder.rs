use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the geocoding service
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned error status: {0}")]
    ApiError(String),

    #[error("Invalid coordinate in response: {0}")]
    InvalidResponse(String),
}

/// Resolves a free-form address, zipcode or city to coordinates
///
/// `Ok(None)` means the service answered but found nothing.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Nominatim search API client
pub struct NominatimClient {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl NominatimClient {
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        // Nominatim's usage policy rejects requests without an identifying agent
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl GeoResolver for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        tracing::debug!("Geocoding: {}", query);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Failed to geocode '{}': {}",
                query,
                response.status()
            )));
        }

        let places: Vec<Place> = response.json().await?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(place.lat.clone()))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(place.lon.clone()))?;

        Ok(Some(Coordinates::new(latitude, longitude)))
    }
}
