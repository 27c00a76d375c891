use std::sync::Arc;
use std::time::Duration;

use domov_common::config::Config;
use domov_common::listing::SourceTag;
use domov_common::progress::MemoryReporter;
use domov_common::query::QueryParams;

use crate::support::{FakePortal, distinct_flats, service_with};

fn portal() -> Arc<FakePortal> {
    Arc::new(FakePortal::serving(
        SourceTag::Sreality,
        distinct_flats(SourceTag::Sreality, 4),
    ))
}

#[tokio::test(start_paused = true)]
async fn repeated_plain_search_reuses_the_snapshot() -> anyhow::Result<()> {
    let portal = portal();
    let service = service_with(vec![portal.clone()], &Config::default(), Arc::new(MemoryReporter::new()));

    let first = service.search(QueryParams::default()).await?;
    tokio::time::advance(Duration::from_secs(120)).await;
    let second = service.search(QueryParams::default()).await?;

    assert_eq!(portal.hits(), 1);
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert!(second.outcomes.is_empty());
    assert_eq!(first.timestamp, second.timestamp);
    assert_eq!(first.listings, second.listings);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn filtered_search_always_fetches() -> anyhow::Result<()> {
    let portal = portal();
    let service = service_with(vec![portal.clone()], &Config::default(), Arc::new(MemoryReporter::new()));
    let params = QueryParams::from_pairs([("priceTo", "9000000")])?;

    service.search(params.clone()).await?;
    let again = service.search(params).await?;

    assert_eq!(portal.hits(), 2);
    assert!(!again.from_cache);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn snapshot_expires_after_the_window() -> anyhow::Result<()> {
    let portal = portal();
    let config = Config {
        staleness_window: Duration::from_secs(30),
        ..Config::default()
    };
    let service = service_with(vec![portal.clone()], &config, Arc::new(MemoryReporter::new()));

    service.search(QueryParams::default()).await?;
    tokio::time::advance(Duration::from_secs(31)).await;
    let refreshed = service.search(QueryParams::default()).await?;

    assert_eq!(portal.hits(), 2);
    assert!(!refreshed.from_cache);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_result_is_not_reused() -> anyhow::Result<()> {
    let broken = Arc::new(FakePortal::broken(SourceTag::Sreality));
    let service = service_with(vec![broken.clone()], &Config::default(), Arc::new(MemoryReporter::new()));

    let first = service.search(QueryParams::default()).await?;
    let second = service.search(QueryParams::default()).await?;

    assert_eq!(first.count, 0);
    assert!(!second.from_cache);
    assert_eq!(broken.hits(), 2);
    Ok(())
}

/// The snapshot is process-wide, so a plain search right after a filtered one
/// is answered with the filtered result.
#[tokio::test(start_paused = true)]
async fn plain_search_reuses_a_filtered_snapshot() -> anyhow::Result<()> {
    let portal = portal();
    let service = service_with(vec![portal.clone()], &Config::default(), Arc::new(MemoryReporter::new()));

    let filtered = service
        .search(QueryParams::from_pairs([("sizeFrom", "45")])?)
        .await?;
    let plain = service.search(QueryParams::default()).await?;

    assert_eq!(portal.hits(), 1);
    assert!(plain.from_cache);
    assert_eq!(plain.listings, filtered.listings);
    assert!(plain.search_params.size_from.is_none());
    Ok(())
}
