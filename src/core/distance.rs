use crate::models::Coordinates;
use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metres in one statute mile
const METERS_PER_MILE: f64 = 1609.344;

/// Geodesic distance between two points in miles
///
/// Uses Karney's algorithm on the WGS84 ellipsoid.
///
/// # Arguments
/// * `from` - First point
/// * `to` - Second point
///
/// # Returns
/// Distance in statute miles
#[inline]
pub fn geodesic_miles(from: Coordinates, to: Coordinates) -> f64 {
    let a = Point::new(from.longitude, from.latitude);
    let b = Point::new(to.longitude, to.latitude);

    a.geodesic_distance(&b) / METERS_PER_MILE
}

/// Distance-from-home memo keyed by location name
///
/// Lives as long as the poll loop that owns it. An entry, once written, is
/// never replaced, even if the location later publishes different
/// coordinates.
#[derive(Debug, Default)]
pub struct DistanceCache {
    distances: HashMap<String, f64>,
    hits: u64,
    misses: u64,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached distance, counting the hit or miss
    pub fn get(&mut self, name: &str) -> Option<f64> {
        match self.distances.get(name) {
            Some(&miles) => {
                self.hits += 1;
                tracing::trace!("Distance cache hit: {}", name);
                Some(miles)
            }
            None => {
                self.misses += 1;
                tracing::trace!("Distance cache miss: {}", name);
                None
            }
        }
    }

    /// Store a distance unless one is already present; returns the stored value
    pub fn insert(&mut self, name: &str, miles: f64) -> f64 {
        *self.distances.entry(name.to_string()).or_insert(miles)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.distances.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn stats(&self) -> DistanceCacheStats {
        let lookups = self.hits + self.misses;
        DistanceCacheStats {
            entries: self.distances.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups > 0 {
                self.hits as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }
}

/// Distance cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}
