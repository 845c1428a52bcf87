// Integration tests for Slot Scout

mod common;

use common::*;
use slot_scout::core::{evaluate, DistanceCache, PollLoop, SourceBackoff};
use slot_scout::models::{Coordinates, Criteria, Manufacturer};
use std::time::Duration;
use tokio::time::Instant;

const HOME: Coordinates = Coordinates {
    latitude: 30.2672,
    longitude: -97.7431,
};

#[tokio::test]
async fn test_integration_end_to_end_scenario() {
    let resolver = CountingResolver::default();
    let mut cache = DistanceCache::new();

    let record_a = create_record("A", "Austin", "78702", 2);
    let record_b = create_record("B", "Dallas", "75201", 0);
    let record_c = with_manufacturer(create_record("C", "Austin", "78701", 5), "Moderna");

    let by_city = Criteria::unrestricted().with_cities(["austin"]);
    assert!(evaluate(&record_a, &by_city, &mut cache, &resolver).await.passed());
    assert!(!evaluate(&record_b, &by_city, &mut cache, &resolver).await.passed());

    let zip_and_moderna = Criteria::unrestricted()
        .with_zipcodes(["78701"])
        .with_category(Manufacturer::Moderna);
    assert!(evaluate(&record_c, &zip_and_moderna, &mut cache, &resolver).await.passed());

    let zip_and_johnson = Criteria::unrestricted()
        .with_zipcodes(["78701"])
        .with_category(Manufacturer::Johnson);
    assert!(!evaluate(&record_c, &zip_and_johnson, &mut cache, &resolver).await.passed());

    // No distance criterion anywhere, so nothing was geocoded
    assert_eq!(resolver.calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_integration_single_round_reports_all_confirmed() {
    let records = vec![
        create_record("North", "Austin", "78750", 3),
        create_record("Closed", "Austin", "78701", 0),
        create_record("BookedOut", "Austin", "78704", 4),
        create_record("Elsewhere", "Houston", "77002", 9),
        create_record("South", "austin", "78745", 1),
    ];
    let source = ScriptedSource::new(vec![Ok(records)]);
    let pages = FakePages::new(&[
        (page_url("North"), AVAILABLE_PAGE),
        (page_url("BookedOut"), BOOKED_PAGE),
        (page_url("South"), AVAILABLE_PAGE),
    ]);

    let mut poller = PollLoop::new(source, CountingResolver::default(), pages.clone());
    let criteria = Criteria::unrestricted().with_cities(["Austin"]);

    let matches = poller.run_round(&criteria).await.unwrap();
    let names: Vec<_> = matches.iter().map(|m| m.location.name.as_str()).collect();

    assert_eq!(names, vec!["North", "South"]);
    // Only records that passed the filters had their pages fetched, in order
    assert_eq!(
        pages.requests(),
        vec![page_url("North"), page_url("BookedOut"), page_url("South")]
    );
}

#[tokio::test]
async fn test_integration_detail_fetch_failure_is_isolated() {
    let records = vec![
        create_record("Flaky", "Austin", "78701", 3),
        create_record("Healthy", "Austin", "78702", 3),
    ];
    let source = ScriptedSource::new(vec![Ok(records)]);
    // No page registered for "Flaky", so fetching it fails
    let pages = FakePages::new(&[(page_url("Healthy"), AVAILABLE_PAGE)]);

    let mut poller = PollLoop::new(source, CountingResolver::default(), pages);
    let matches = poller.run_round(&Criteria::unrestricted()).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].location.name, "Healthy");
}

#[tokio::test]
async fn test_integration_unresolved_location_does_not_stop_round() {
    let near = Coordinates::new(30.30, -97.75);
    let records = vec![
        create_record("Lost", "Nowhere", "00000", 3),
        with_coordinates(create_record("Near", "Austin", "78701", 3), near),
    ];
    let source = ScriptedSource::new(vec![Ok(records)]);
    let pages = FakePages::new(&[
        (page_url("Lost"), AVAILABLE_PAGE),
        (page_url("Near"), AVAILABLE_PAGE),
    ]);
    let resolver = CountingResolver::default();

    let mut poller = PollLoop::new(source, resolver.clone(), pages);
    let criteria = Criteria::unrestricted().with_radius(HOME, 20.0);
    let matches = poller.run_round(&criteria).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].location.name, "Near");
    assert!(matches[0].distance_miles.unwrap() < 20.0);
    // Address then zip for "Lost"; "Near" publishes its own coordinates
    assert_eq!(resolver.calls(), 2);
    assert!(!poller.cache().contains("Lost"));
    assert!(poller.cache().contains("Near"));
}

#[tokio::test(start_paused = true)]
async fn test_integration_poll_until_second_round() {
    let first = vec![create_record("Store", "Austin", "78701", 0)];
    let second = vec![create_record("Store", "Austin", "78701", 2)];
    let source = ScriptedSource::new(vec![Ok(first), Ok(second)]);
    let pages = FakePages::new(&[(page_url("Store"), AVAILABLE_PAGE)]);

    let mut poller = PollLoop::new(source.clone(), CountingResolver::default(), pages);
    let progress = poller.progress();

    let started = Instant::now();
    let report = poller.run(&Criteria::unrestricted()).await;
    let elapsed = started.elapsed();

    assert_eq!(report.rounds, 2);
    assert_eq!(progress.rounds(), 2);
    assert_eq!(source.fetches(), 2);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].location.name, "Store");
    assert!(report.matches[0].distance_miles.is_none());

    // Exactly one one-second pause between the two rounds
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_integration_empty_snapshot_keeps_polling() {
    let found = vec![create_record("Store", "Austin", "78701", 1)];
    let source = ScriptedSource::new(vec![Ok(vec![]), Ok(vec![]), Ok(found)]);
    let pages = FakePages::new(&[(page_url("Store"), AVAILABLE_PAGE)]);

    let mut poller = PollLoop::new(source.clone(), CountingResolver::default(), pages)
        .with_interval(Duration::from_millis(500));

    let started = Instant::now();
    let report = poller.run(&Criteria::unrestricted()).await;

    assert_eq!(report.rounds, 3);
    assert_eq!(source.fetches(), 3);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_integration_feed_outage_backs_off() {
    let found = vec![create_record("Store", "Austin", "78701", 1)];
    let source = ScriptedSource::new(vec![
        Err("503 Service Unavailable".to_string()),
        Err("503 Service Unavailable".to_string()),
        Ok(found),
    ]);
    let pages = FakePages::new(&[(page_url("Store"), AVAILABLE_PAGE)]);

    let mut poller = PollLoop::new(source.clone(), CountingResolver::default(), pages)
        .with_backoff(SourceBackoff {
            base: Duration::from_secs(2),
            max: Duration::from_secs(30),
        });

    let started = Instant::now();
    let report = poller.run(&Criteria::unrestricted()).await;
    let elapsed = started.elapsed();

    assert_eq!(report.rounds, 3);
    assert_eq!(source.fetches(), 3);
    // 2s after the first failure, 4s after the second
    assert!(elapsed >= Duration::from_secs(6));
    assert!(elapsed < Duration::from_secs(7));
}

#[tokio::test]
async fn test_integration_distance_cache_survives_rounds() {
    let store = create_record("Store", "Austin", "78701", 1);
    let address = store.address_query();
    let resolver = CountingResolver::new(&[(address.as_str(), Coordinates::new(30.27, -97.74))]);

    // The page stays booked out, so the same location is evaluated twice
    let source = ScriptedSource::new(vec![Ok(vec![store.clone()]), Ok(vec![store])]);
    let booked = FakePages::new(&[(page_url("Store"), BOOKED_PAGE)]);

    let criteria = Criteria::unrestricted().with_radius(HOME, 10.0);

    let mut poller = PollLoop::new(source.clone(), resolver.clone(), booked);
    assert!(poller.run_round(&criteria).await.unwrap().is_empty());
    assert!(poller.run_round(&criteria).await.unwrap().is_empty());

    assert_eq!(source.fetches(), 2);
    assert_eq!(resolver.calls(), 1);

    let stats = poller.cache().stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}
