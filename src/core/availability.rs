use crate::models::LocationRecord;
use crate::services::PageFetcher;

/// Text the booking page shows once a location has run out
pub const NO_AVAILABILITY_MARKER: &str = "Appointments are no longer available for this location";

/// Live confirmation against a location's detail page
///
/// The feed lags behind the booking system, so a location that passes the
/// filters is only reported once its page still offers appointments.
pub struct AvailabilityChecker<F> {
    fetcher: F,
}

impl<F: PageFetcher> AvailabilityChecker<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// `true` when the detail page does not carry the sold-out marker
    ///
    /// A failed fetch counts as unavailable for this round only.
    pub async fn confirm(&self, record: &LocationRecord) -> bool {
        if record.url.is_empty() {
            tracing::warn!("Location '{}' has no detail URL", record.name);
            return false;
        }

        match self.fetcher.fetch_text(&record.url).await {
            Ok(body) => {
                let available = !body.contains(NO_AVAILABILITY_MARKER);
                if !available {
                    tracing::debug!("'{}' is already booked out", record.name);
                }
                available
            }
            Err(e) => {
                tracing::warn!("Failed to confirm '{}': {}", record.name, e);
                false
            }
        }
    }
}
