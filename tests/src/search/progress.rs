use std::sync::Arc;

use domov_common::config::Config;
use domov_common::listing::SourceTag;
use domov_common::progress::{BroadcastReporter, ProgressLevel};
use domov_common::query::QueryParams;

use crate::support::{FakePortal, distinct_flats, service_with};

#[tokio::test]
async fn subscriber_sees_the_whole_search_lifecycle() -> anyhow::Result<()> {
    let reporter = Arc::new(BroadcastReporter::new(64));
    let mut events = reporter.subscribe();
    let service = service_with(
        vec![
            Arc::new(FakePortal::serving(
                SourceTag::Sreality,
                distinct_flats(SourceTag::Sreality, 2),
            )),
            Arc::new(FakePortal::broken(SourceTag::Bezrealitky)),
        ],
        &Config::default(),
        reporter.clone(),
    );

    service.search(QueryParams::default()).await?;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    let messages: Vec<&str> = received.iter().map(|e| e.message.as_str()).collect();

    assert_eq!(messages.first(), Some(&"Starting property search for selected sources..."));
    assert!(messages.contains(&"sreality: found 2 listings"));
    assert!(messages.contains(&"bezrealitky failed: unexpected status 503"));
    assert!(messages.contains(&"Search completed: 2 listings total (sreality: 2, bezrealitky: failed)"));
    assert!(messages.last().is_some_and(|m| m.starts_with("Duplicate analysis:")));

    let errors: Vec<_> = received
        .iter()
        .filter(|e| e.level == ProgressLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);

    let wire = serde_json::to_value(errors[0])?;
    assert_eq!(wire["type"], "error");
    assert!(wire["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn cached_answer_emits_no_progress() -> anyhow::Result<()> {
    let reporter = Arc::new(BroadcastReporter::new(64));
    let service = service_with(
        vec![Arc::new(FakePortal::serving(
            SourceTag::Sreality,
            distinct_flats(SourceTag::Sreality, 1),
        ))],
        &Config::default(),
        reporter.clone(),
    );

    service.search(QueryParams::default()).await?;
    let mut events = reporter.subscribe();
    let cached = service.search(QueryParams::default()).await?;

    assert!(cached.from_cache);
    assert!(events.try_recv().is_err());
    Ok(())
}
