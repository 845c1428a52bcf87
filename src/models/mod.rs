// Model exports
pub mod domain;
pub mod feed;

pub use domain::{Coordinates, Criteria, LocationRecord, Manufacturer, MatchedLocation, Radius, SlotDetail, UnknownManufacturer};
pub use feed::LocationFeed;
