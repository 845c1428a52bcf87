use crate::core::distance::{geodesic_miles, DistanceCache};
use crate::models::{Coordinates, Criteria, LocationRecord, Manufacturer, Radius};
use crate::services::GeoResolver;
use thiserror::Error;

/// Why a record failed the filter chain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("city '{0}' is not selected")]
    CityNotSelected(String),

    #[error("zipcode {0:?} is not selected")]
    ZipNotSelected(Option<String>),

    #[error("location '{0}' could not be geocoded")]
    Unresolved(String),

    #[error("{distance_miles:.1} miles from home exceeds limit of {max_miles} miles")]
    TooFar { distance_miles: f64, max_miles: f64 },

    #[error("no open timeslots")]
    NoOpenSlots,

    #[error("no {0} slots offered")]
    CategoryUnavailable(Manufacturer),
}

/// Outcome of evaluating one record
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub distance_miles: Option<f64>,
    pub rejection: Option<Rejection>,
}

impl MatchResult {
    fn pass(distance_miles: Option<f64>) -> Self {
        Self {
            distance_miles,
            rejection: None,
        }
    }

    fn reject(rejection: Rejection, distance_miles: Option<f64>) -> Self {
        Self {
            distance_miles,
            rejection: Some(rejection),
        }
    }

    pub fn passed(&self) -> bool {
        self.rejection.is_none()
    }
}

/// City filter, compared case-insensitively
#[inline]
pub fn matches_city(record: &LocationRecord, criteria: &Criteria) -> bool {
    criteria
        .cities()
        .map_or(true, |cities| cities.contains(&record.city.to_lowercase()))
}

/// Zipcode filter; a record without a zip never matches a zip list
#[inline]
pub fn matches_zipcode(record: &LocationRecord, criteria: &Criteria) -> bool {
    criteria.zipcodes().map_or(true, |zips| {
        record
            .zip
            .as_deref()
            .is_some_and(|zip| zips.contains(zip.trim()))
    })
}

#[inline]
pub fn has_open_slots(record: &LocationRecord) -> bool {
    record.open_slots() > 0
}

/// Manufacturer filter over the record's slot details
#[inline]
pub fn matches_category(record: &LocationRecord, criteria: &Criteria) -> bool {
    criteria
        .category()
        .map_or(true, |manufacturer| record.offers(manufacturer))
}

/// Run one record through the filter chain
///
/// Checks run cheapest first and stop at the first failure:
/// 1. City
/// 2. Zipcode
/// 3. Distance from home (cached per location name, geocoding on miss)
/// 4. Open timeslots
/// 5. Manufacturer
///
/// The only side effect is populating `cache`.
pub async fn evaluate<G>(
    record: &LocationRecord,
    criteria: &Criteria,
    cache: &mut DistanceCache,
    resolver: &G,
) -> MatchResult
where
    G: GeoResolver + ?Sized,
{
    if !matches_city(record, criteria) {
        return MatchResult::reject(Rejection::CityNotSelected(record.city.clone()), None);
    }

    if !matches_zipcode(record, criteria) {
        return MatchResult::reject(Rejection::ZipNotSelected(record.zip.clone()), None);
    }

    let mut distance_miles = None;
    if let Some(radius) = criteria.radius() {
        let Some(miles) = resolve_distance(record, radius, cache, resolver).await else {
            return MatchResult::reject(Rejection::Unresolved(record.name.clone()), None);
        };

        distance_miles = Some(miles);
        if miles > radius.max_miles {
            return MatchResult::reject(
                Rejection::TooFar {
                    distance_miles: miles,
                    max_miles: radius.max_miles,
                },
                distance_miles,
            );
        }
    }

    if !has_open_slots(record) {
        return MatchResult::reject(Rejection::NoOpenSlots, distance_miles);
    }

    if let Some(manufacturer) = criteria.category() {
        if !record.offers(manufacturer) {
            return MatchResult::reject(Rejection::CategoryUnavailable(manufacturer), distance_miles);
        }
    }

    MatchResult::pass(distance_miles)
}

/// Distance from home, from cache or freshly computed and cached
async fn resolve_distance<G>(
    record: &LocationRecord,
    radius: &Radius,
    cache: &mut DistanceCache,
    resolver: &G,
) -> Option<f64>
where
    G: GeoResolver + ?Sized,
{
    if let Some(miles) = cache.get(&record.name) {
        return Some(miles);
    }

    let location = match record.coordinates() {
        Some(coords) => coords,
        None => resolve_location(record, resolver).await?,
    };

    let miles = geodesic_miles(radius.home, location);
    Some(cache.insert(&record.name, miles))
}

/// Geocode a record by full address, falling back to its zip alone
async fn resolve_location<G>(record: &LocationRecord, resolver: &G) -> Option<Coordinates>
where
    G: GeoResolver + ?Sized,
{
    if let Some(coords) = lookup(resolver, &record.address_query()).await {
        return Some(coords);
    }

    let zip = record.zip.as_deref().map(str::trim).filter(|z| !z.is_empty())?;
    let coords = lookup(resolver, zip).await;
    if coords.is_none() {
        tracing::warn!("Could not geocode '{}' by address or zip {}", record.name, zip);
    }
    coords
}

async fn lookup<G>(resolver: &G, query: &str) -> Option<Coordinates>
where
    G: GeoResolver + ?Sized,
{
    match resolver.geocode(query).await {
        Ok(coords) => coords,
        Err(e) => {
            tracing::warn!("Geocoding '{}' failed: {}", query, e);
            None
        }
    }
}
