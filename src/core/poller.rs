use crate::core::availability::AvailabilityChecker;
use crate::core::distance::{DistanceCache, DistanceCacheStats};
use crate::core::filters::evaluate;
use crate::models::{Criteria, MatchedLocation};
use crate::services::{FeedError, GeoResolver, LocationSource, PageFetcher};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default pause between rounds
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Delay schedule after the location feed itself fails
///
/// Doubles from `base` per consecutive failure, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceBackoff {
    pub base: Duration,
    pub max: Duration,
}

impl SourceBackoff {
    /// Delay after `failures` consecutive failed fetches (1-based)
    pub fn delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.base
            .checked_mul(1u32 << exponent)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for SourceBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(2),
            max: Duration::from_secs(60),
        }
    }
}

/// Shared count of completed rounds
///
/// Clones observe the same counter, so a caller can watch a running loop.
#[derive(Debug, Clone, Default)]
pub struct Progress(Arc<AtomicU64>);

impl Progress {
    pub fn rounds(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Terminal result of a successful poll
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub matches: Vec<MatchedLocation>,
    pub rounds: u64,
    #[serde(rename = "foundAt")]
    pub found_at: DateTime<Utc>,
    #[serde(rename = "distanceCache")]
    pub distance_cache: DistanceCacheStats,
}

/// Poll-until-match driver
///
/// Each round re-fetches the whole snapshot and re-runs every record through
/// the filter chain in snapshot order, then confirms the passes one by one.
/// The distance cache is the only state carried between rounds.
pub struct PollLoop<S, G, F> {
    source: S,
    resolver: G,
    checker: AvailabilityChecker<F>,
    cache: DistanceCache,
    interval: Duration,
    backoff: SourceBackoff,
    progress: Progress,
}

impl<S, G, F> PollLoop<S, G, F>
where
    S: LocationSource,
    G: GeoResolver,
    F: PageFetcher,
{
    pub fn new(source: S, resolver: G, fetcher: F) -> Self {
        Self {
            source,
            resolver,
            checker: AvailabilityChecker::new(fetcher),
            cache: DistanceCache::new(),
            interval: DEFAULT_INTERVAL,
            backoff: SourceBackoff::default(),
            progress: Progress::default(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_backoff(mut self, backoff: SourceBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Handle to the round counter
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    /// Evaluate one snapshot and return every confirmed location
    pub async fn run_round(
        &mut self,
        criteria: &Criteria,
    ) -> Result<Vec<MatchedLocation>, FeedError> {
        let records = self.source.fetch_all().await?;
        let total = records.len();

        let mut passing = Vec::new();
        for record in records {
            let result = evaluate(&record, criteria, &mut self.cache, &self.resolver).await;
            match &result.rejection {
                None => passing.push((record, result.distance_miles)),
                Some(reason) => tracing::debug!("Skipping '{}': {}", record.name, reason),
            }
        }

        tracing::debug!("{} of {} locations passed filters", passing.len(), total);

        let mut matches = Vec::new();
        for (location, distance_miles) in passing {
            if self.checker.confirm(&location).await {
                tracing::info!("Found open appointments at '{}'", location.name);
                matches.push(MatchedLocation {
                    location,
                    distance_miles,
                });
            }
        }

        Ok(matches)
    }

    /// Poll until at least one location is confirmed
    ///
    /// Never returns without a match; stop it by dropping the future or
    /// terminating the process. A failed feed fetch is retried after a
    /// backoff delay instead of aborting.
    pub async fn run(&mut self, criteria: &Criteria) -> MatchReport {
        let mut failures = 0u32;

        loop {
            let outcome = self.run_round(criteria).await;
            let round = self.progress.advance();

            let delay = match outcome {
                Ok(matches) if !matches.is_empty() => {
                    return MatchReport {
                        matches,
                        rounds: round,
                        found_at: Utc::now(),
                        distance_cache: self.cache.stats(),
                    };
                }
                Ok(_) => {
                    failures = 0;
                    tracing::info!(round, "No open appointments yet");
                    self.interval
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = self.backoff.delay(failures).max(self.interval);
                    tracing::warn!(
                        round,
                        failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Location feed unavailable, retrying after back-off"
                    );
                    delay
                }
            };

            tokio::time::sleep(delay).await;
        }
    }
}
