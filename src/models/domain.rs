use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::feed::{nullable_string, nullable_vec};

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// One bookable slot group advertised by a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDetail {
    #[serde(default, deserialize_with = "nullable_string")]
    pub manufacturer: String,
}

/// A retail location as published by the inventory feed
///
/// Produced fresh every poll round and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "openTimeslots", default)]
    pub open_timeslots: Option<u32>,
    #[serde(rename = "slotDetails", default, deserialize_with = "nullable_vec")]
    pub slot_details: Vec<SlotDetail>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
}

impl LocationRecord {
    /// Open slot count, treating a missing value as zero
    pub fn open_slots(&self) -> u32 {
        self.open_timeslots.unwrap_or(0)
    }

    /// Published coordinates, only when both halves are present
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }

    /// Full postal address as a single geocoder query: "street, city, state, zip"
    pub fn address_query(&self) -> String {
        [
            self.street.as_deref(),
            Some(self.city.as_str()),
            self.state.as_deref(),
            self.zip.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Whether any slot group is for the given manufacturer (case-insensitive)
    pub fn offers(&self, manufacturer: Manufacturer) -> bool {
        self.slot_details
            .iter()
            .any(|slot| slot.manufacturer.eq_ignore_ascii_case(manufacturer.display_name()))
    }
}

/// Product category selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Manufacturer {
    Moderna,
    Johnson,
    Pfizer,
}

impl Manufacturer {
    pub const ALL: [Manufacturer; 3] = [Self::Moderna, Self::Johnson, Self::Pfizer];

    /// One-letter code used by the `-T` flag
    pub fn code(self) -> char {
        match self {
            Self::Moderna => 'M',
            Self::Johnson => 'J',
            Self::Pfizer => 'P',
        }
    }

    /// Name as it appears in the feed's slot details
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Moderna => "Moderna",
            Self::Johnson => "Johnson",
            Self::Pfizer => "Pfizer",
        }
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown manufacturer code '{0}' (expected one of M, J, P)")]
pub struct UnknownManufacturer(pub String);

impl FromStr for Manufacturer {
    type Err = UnknownManufacturer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| code.len() == 1 && code.eq_ignore_ascii_case(&m.code().to_string()))
            .ok_or_else(|| UnknownManufacturer(s.to_string()))
    }
}

/// Maximum distance from a resolved home point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radius {
    pub home: Coordinates,
    pub max_miles: f64,
}

/// Constraints for one run
///
/// Cities are stored lower-cased. A distance limit always carries its home
/// point, see [`Radius`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    cities: Option<HashSet<String>>,
    zipcodes: Option<HashSet<String>>,
    radius: Option<Radius>,
    category: Option<Manufacturer>,
}

impl Criteria {
    /// Criteria with no constraints beyond open slots
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cities = Some(
            cities
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn with_zipcodes<I, S>(mut self, zipcodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.zipcodes = Some(
            zipcodes
                .into_iter()
                .map(|z| z.as_ref().trim().to_string())
                .collect(),
        );
        self
    }

    pub fn with_radius(mut self, home: Coordinates, max_miles: f64) -> Self {
        self.radius = Some(Radius { home, max_miles });
        self
    }

    pub fn with_category(mut self, category: Manufacturer) -> Self {
        self.category = Some(category);
        self
    }

    pub fn cities(&self) -> Option<&HashSet<String>> {
        self.cities.as_ref()
    }

    pub fn zipcodes(&self) -> Option<&HashSet<String>> {
        self.zipcodes.as_ref()
    }

    pub fn radius(&self) -> Option<&Radius> {
        self.radius.as_ref()
    }

    pub fn category(&self) -> Option<Manufacturer> {
        self.category
    }
}

/// A confirmed location, ready for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedLocation {
    pub location: LocationRecord,
    #[serde(rename = "distanceMiles")]
    pub distance_miles: Option<f64>,
}

impl fmt::Display for MatchedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = &self.location;
        writeln!(f, "name={}", loc.name)?;
        if let Some(street) = &loc.street {
            writeln!(f, "street={}", street)?;
        }
        if !loc.city.is_empty() {
            writeln!(f, "city={}", loc.city)?;
        }
        if let Some(state) = &loc.state {
            writeln!(f, "state={}", state)?;
        }
        if let Some(zip) = &loc.zip {
            writeln!(f, "zip={}", zip)?;
        }
        if let Some(lat) = loc.latitude {
            writeln!(f, "latitude={}", lat)?;
        }
        if let Some(lon) = loc.longitude {
            writeln!(f, "longitude={}", lon)?;
        }
        writeln!(f, "openTimeslots={}", loc.open_slots())?;
        if let Some(miles) = self.distance_miles {
            writeln!(f, "Distance from home: {:.2} miles", miles)?;
        }
        write!(f, "Book at: {}", loc.url)
    }
}
