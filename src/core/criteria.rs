use crate::models::{Criteria, Manufacturer};
use crate::services::{GeoResolver, GeocodeError};
use thiserror::Error;

/// Fatal problems found before polling starts
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("home location and distance must be supplied together")]
    IncompleteRadius,

    #[error("distance must be a non-negative number of miles, got {0}")]
    InvalidDistance(f64),

    #[error("home location '{0}' could not be found")]
    HomeNotFound(String),

    #[error("geocoding home location '{query}' failed: {source}")]
    Geocoding {
        query: String,
        #[source]
        source: GeocodeError,
    },
}

/// Raw search constraints as entered by the user
#[derive(Debug, Clone, Default)]
pub struct CriteriaBuilder {
    pub cities: Option<Vec<String>>,
    pub zipcodes: Option<Vec<String>>,
    pub home: Option<String>,
    pub distance_miles: Option<f64>,
    pub category: Option<Manufacturer>,
}

impl CriteriaBuilder {
    /// Validate the inputs and resolve the home location
    ///
    /// The resolver is only consulted when a distance limit is requested.
    pub async fn build<G>(self, resolver: &G) -> Result<Criteria, ConfigurationError>
    where
        G: GeoResolver + ?Sized,
    {
        let mut criteria = Criteria::unrestricted();

        if let Some(cities) = self.cities {
            criteria = criteria.with_cities(cities);
        }
        if let Some(zipcodes) = self.zipcodes {
            criteria = criteria.with_zipcodes(zipcodes);
        }

        match (self.home, self.distance_miles) {
            (None, None) => {}
            (Some(home), Some(miles)) => {
                if !miles.is_finite() || miles < 0.0 {
                    return Err(ConfigurationError::InvalidDistance(miles));
                }

                let coords = resolver
                    .geocode(&home)
                    .await
                    .map_err(|source| ConfigurationError::Geocoding {
                        query: home.clone(),
                        source,
                    })?
                    .ok_or_else(|| ConfigurationError::HomeNotFound(home.clone()))?;

                tracing::info!("Resolved home '{}' to {}", home, coords);
                criteria = criteria.with_radius(coords, miles);
            }
            _ => return Err(ConfigurationError::IncompleteRadius),
        }

        if let Some(category) = self.category {
            criteria = criteria.with_category(category);
        }

        Ok(criteria)
    }
}
