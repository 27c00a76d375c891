use std::sync::Arc;
use std::time::Duration;

use domov_common::config::Config;
use domov_common::listing::{GroupColor, SourceTag};
use domov_common::progress::{MemoryReporter, ProgressLevel};
use domov_common::query::{City, QueryParams};
use domov_common::source::SourceError;
use domov_core::orchestrator::SourceOutcome;
use domov_core::registry::ConfigError;
use domov_core::search::SearchError;

use crate::support::{FakePortal, distinct_flats, flat, service_with};

/// One portal down, the other serving three listings: the search still
/// succeeds and the failure only shows up in progress and outcomes.
#[tokio::test]
async fn search_survives_a_failing_portal() -> anyhow::Result<()> {
    let sreality = Arc::new(FakePortal::broken(SourceTag::Sreality));
    let bezrealitky = Arc::new(FakePortal::serving(
        SourceTag::Bezrealitky,
        distinct_flats(SourceTag::Bezrealitky, 3),
    ));
    let reporter = Arc::new(MemoryReporter::new());
    let service = service_with(
        vec![sreality.clone(), bezrealitky.clone()],
        &Config::default(),
        reporter.clone(),
    );

    let response = service.search(QueryParams::default()).await?;

    assert_eq!(response.count, 3);
    assert_eq!(response.stats.total, 3);
    assert_eq!(response.stats.count(SourceTag::Sreality), 0);
    assert_eq!(response.stats.count(SourceTag::Bezrealitky), 3);
    assert_eq!(
        response.outcomes,
        vec![
            (SourceTag::Sreality, SourceOutcome::Failed(SourceError::Status(503))),
            (SourceTag::Bezrealitky, SourceOutcome::Fetched(3)),
        ]
    );

    let events = reporter.events();
    let failure = events
        .iter()
        .find(|e| e.level == ProgressLevel::Error)
        .expect("failure is reported");
    assert_eq!(failure.message, "sreality failed: unexpected status 503");
    assert!(
        reporter
            .messages()
            .contains(&"Search completed: 3 listings total (sreality: failed, bezrealitky: 3)".to_string())
    );
    Ok(())
}

/// The same flat listed on two portals with slightly different spelling and
/// price lands in one colored group.
#[tokio::test]
async fn cross_portal_duplicates_share_a_group() -> anyhow::Result<()> {
    let sreality = Arc::new(FakePortal::serving(
        SourceTag::Sreality,
        vec![
            flat(SourceTag::Sreality, "s1", 8_100_000.0, 54.0, "Praha 1 - Staré Město"),
            flat(SourceTag::Sreality, "s2", 4_000_000.0, 40.0, "Brno - Žabovřesky"),
        ],
    ));
    let bezrealitky = Arc::new(FakePortal::serving(
        SourceTag::Bezrealitky,
        vec![flat(
            SourceTag::Bezrealitky,
            "b1",
            8_102_000.0,
            54.2,
            "praha 1 -  stare mesto",
        )],
    ));
    let reporter = Arc::new(MemoryReporter::new());
    let service = service_with(vec![sreality, bezrealitky], &Config::default(), reporter.clone());

    let response = service.search(QueryParams::default()).await?;

    let grouped: Vec<&str> = response
        .listings
        .iter()
        .filter(|l| l.group_color == Some(GroupColor::Yellow))
        .map(|l| l.id.as_str())
        .collect();
    // b1 is a little cheaper per m², so it ranks first within the pair.
    assert_eq!(grouped, vec!["bezrealitky-b1", "sreality-s1"]);
    assert!(
        response
            .listings
            .iter()
            .filter(|l| l.group_color.is_some())
            .all(|l| l.duplicate_count == Some(2))
    );

    let single = response.listings.iter().find(|l| l.id == "sreality-s2").unwrap();
    assert_eq!(single.group_color, None);
    assert_eq!(single.duplicate_count, None);

    let summary = reporter
        .messages()
        .into_iter()
        .find(|m| m.starts_with("Duplicate analysis:"))
        .expect("dedup summary is reported");
    assert!(summary.contains("Total unique listings: 1"));
    assert!(summary.contains("Total duplicate listings: 2"));
    assert!(summary.contains("Number of duplicate groups: 1"));
    assert!(summary.ends_with("Group of 2 listings: sreality, bezrealitky"));
    Ok(())
}

#[tokio::test]
async fn listings_are_ranked_by_price_per_meter() -> anyhow::Result<()> {
    let mut unknown_size = flat(SourceTag::Sreality, "n", 5_000_000.0, 1.0, "Ostrava");
    unknown_size.size = None;
    unknown_size.refresh_price_per_meter();

    let sreality = Arc::new(FakePortal::serving(
        SourceTag::Sreality,
        vec![
            unknown_size,
            flat(SourceTag::Sreality, "dear", 9_000_000.0, 50.0, "Praha 2"),
            flat(SourceTag::Sreality, "cheap", 3_000_000.0, 60.0, "Ostrava 1"),
        ],
    ));
    let service = service_with(vec![sreality], &Config::default(), Arc::new(MemoryReporter::new()));

    let response = service.search(QueryParams::default()).await?;

    let ids: Vec<&str> = response.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["sreality-cheap", "sreality-dear", "sreality-n"]);
    assert_eq!(response.listings[0].price_per_meter, Some(50_000));
    assert_eq!(response.listings[1].price_per_meter, Some(180_000));
    assert_eq!(response.listings[2].price_per_meter, None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn hanging_portal_is_cut_off_at_the_deadline() -> anyhow::Result<()> {
    let slow = Arc::new(
        FakePortal::serving(SourceTag::Sreality, distinct_flats(SourceTag::Sreality, 2))
            .with_latency(Duration::from_secs(600)),
    );
    let fast = Arc::new(FakePortal::serving(
        SourceTag::Bezrealitky,
        distinct_flats(SourceTag::Bezrealitky, 1),
    ));
    let config = Config {
        source_deadline: Some(Duration::from_secs(60)),
        ..Config::default()
    };
    let service = service_with(vec![slow, fast], &config, Arc::new(MemoryReporter::new()));

    let response = service.search(QueryParams::default()).await?;

    assert_eq!(response.count, 1);
    assert_eq!(
        response.outcomes[0],
        (
            SourceTag::Sreality,
            SourceOutcome::Failed(SourceError::TimedOut(Duration::from_secs(60)))
        )
    );
    Ok(())
}

#[tokio::test]
async fn selecting_a_portal_without_adapter_is_rejected() {
    let sreality = Arc::new(FakePortal::serving(
        SourceTag::Sreality,
        distinct_flats(SourceTag::Sreality, 1),
    ));
    let service = service_with(vec![sreality.clone()], &Config::default(), Arc::new(MemoryReporter::new()));

    let params = QueryParams::from_pairs([("sources", "sreality,idnes")]).unwrap();
    let result = service.search(params).await;

    assert!(matches!(
        result,
        Err(SearchError::Config(ConfigError::UnknownSource(SourceTag::Idnes)))
    ));
    assert_eq!(sreality.hits(), 0);
}

#[tokio::test]
async fn response_serializes_to_the_wire_shape() -> anyhow::Result<()> {
    let bezrealitky = Arc::new(FakePortal::serving(
        SourceTag::Bezrealitky,
        distinct_flats(SourceTag::Bezrealitky, 2),
    ));
    let config = Config {
        default_location: City::Brno,
        ..Config::default()
    };
    let service = service_with(vec![bezrealitky], &config, Arc::new(MemoryReporter::new()));

    let params = QueryParams::from_pairs([("sizeFrom", "40")])?;
    let response = service.search(params).await?;
    let json = serde_json::to_value(&response)?;

    assert_eq!(json["count"], 2);
    assert_eq!(json["stats"], serde_json::json!({ "total": 2, "bezrealitky": 2 }));
    assert_eq!(
        json["searchParams"],
        serde_json::json!({ "location": "brno", "sizeFrom": 40, "sources": ["bezrealitky"] })
    );

    let first = &json["listings"][0];
    assert_eq!(first["id"], "bezrealitky-1");
    assert_eq!(first["pricePerMeter"], 72_222);
    assert!(first["timestamp"].is_string());
    assert!(first["groupColor"].is_null());
    Ok(())
}
