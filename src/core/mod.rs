// Core algorithm exports
pub mod availability;
pub mod criteria;
pub mod distance;
pub mod filters;
pub mod poller;

pub use availability::{AvailabilityChecker, NO_AVAILABILITY_MARKER};
pub use criteria::{ConfigurationError, CriteriaBuilder};
pub use distance::{geodesic_miles, DistanceCache, DistanceCacheStats};
pub use filters::{evaluate, has_open_slots, matches_category, matches_city, matches_zipcode, MatchResult, Rejection};
pub use poller::{MatchReport, PollLoop, Progress, SourceBackoff, DEFAULT_INTERVAL};
