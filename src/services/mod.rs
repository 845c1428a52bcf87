// Service exports
pub mod feed;
pub mod geocoder;
pub mod pages;

pub use feed::{FeedClient, FeedError, LocationSource};
pub use geocoder::{GeoResolver, GeocodeError, NominatimClient};
pub use pages::{FetchError, PageClient, PageFetcher};
