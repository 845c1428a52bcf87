//! Slot Scout - watches a retail location feed for open appointment slots
//!
//! This library provides the filtering-and-matching engine: the filter chain
//! that decides whether a location satisfies the caller's criteria, the
//! per-location distance cache, and the poll-until-match loop. The location
//! feed, geocoder and detail pages are reached through the traits in
//! [`services`].

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{evaluate, geodesic_miles, CriteriaBuilder, DistanceCache, MatchReport, MatchResult, PollLoop};
pub use crate::models::{Coordinates, Criteria, LocationRecord, Manufacturer, MatchedLocation};
