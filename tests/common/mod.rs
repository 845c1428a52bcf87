// In-memory stand-ins for the feed, geocoder and detail pages
//
// Each fake is cheap to clone and clones share state, so a test can hand one
// to a poll loop and keep another to inspect afterwards.

#![allow(dead_code)]

use async_trait::async_trait;
use slot_scout::models::{Coordinates, LocationRecord, SlotDetail};
use slot_scout::services::{
    FeedError, FetchError, GeoResolver, GeocodeError, LocationSource, PageFetcher,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const AVAILABLE_PAGE: &str = "<h1>Select an appointment time</h1>";
pub const BOOKED_PAGE: &str =
    "<div>Appointments are no longer available for this location</div>";

pub fn create_record(name: &str, city: &str, zip: &str, slots: u32) -> LocationRecord {
    LocationRecord {
        name: name.to_string(),
        street: Some("100 Main St".to_string()),
        city: city.to_string(),
        state: Some("TX".to_string()),
        zip: Some(zip.to_string()),
        latitude: None,
        longitude: None,
        open_timeslots: Some(slots),
        slot_details: vec![],
        url: page_url(name),
    }
}

pub fn page_url(name: &str) -> String {
    format!("https://example.test/store/{}", name)
}

pub fn with_manufacturer(mut record: LocationRecord, manufacturer: &str) -> LocationRecord {
    record.slot_details.push(SlotDetail {
        manufacturer: manufacturer.to_string(),
    });
    record
}

pub fn with_coordinates(mut record: LocationRecord, coords: Coordinates) -> LocationRecord {
    record.latitude = Some(coords.latitude);
    record.longitude = Some(coords.longitude);
    record
}

type Snapshot = Result<Vec<LocationRecord>, String>;

#[derive(Default)]
struct ScriptState {
    script: Mutex<VecDeque<Snapshot>>,
    last: Mutex<Vec<LocationRecord>>,
    fetches: AtomicUsize,
}

/// Feed that replays a script of snapshots, repeating the last good one
#[derive(Clone, Default)]
pub struct ScriptedSource(Arc<ScriptState>);

impl ScriptedSource {
    pub fn new(script: Vec<Snapshot>) -> Self {
        Self(Arc::new(ScriptState {
            script: Mutex::new(script.into()),
            ..Default::default()
        }))
    }

    pub fn fetches(&self) -> usize {
        self.0.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<LocationRecord>, FeedError> {
        self.0.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.0.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(records)) => {
                *self.0.last.lock().unwrap() = records.clone();
                Ok(records)
            }
            Some(Err(message)) => Err(FeedError::ApiError(message)),
            None => Ok(self.0.last.lock().unwrap().clone()),
        }
    }
}

/// Geocoder backed by a lookup table, counting every call
#[derive(Clone, Default)]
pub struct CountingResolver {
    table: Arc<HashMap<String, Coordinates>>,
    calls: Arc<AtomicUsize>,
}

impl CountingResolver {
    pub fn new(entries: &[(&str, Coordinates)]) -> Self {
        Self {
            table: Arc::new(entries.iter().map(|(q, c)| (q.to_string(), *c)).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoResolver for CountingResolver {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.table.get(query).copied())
    }
}

/// Detail pages keyed by URL; unknown URLs fail like an unreachable host
#[derive(Clone, Default)]
pub struct FakePages {
    pages: Arc<HashMap<String, String>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakePages {
    pub fn new(pages: &[(String, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, body)| (url.clone(), body.to_string()))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakePages {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 503,
        })
    }
}
