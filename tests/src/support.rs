use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use domov_common::config::Config;
use domov_common::listing::{Listing, SourceTag};
use domov_common::progress::ProgressReporter;
use domov_common::query::QueryParams;
use domov_common::source::{SourceAdapter, SourceError};
use domov_core::registry::SourceRegistry;
use domov_core::search::SearchService;

/// In-process stand-in for a listing portal.
pub struct FakePortal {
    tag: SourceTag,
    answer: Result<Vec<Listing>, SourceError>,
    latency: Duration,
    hits: AtomicUsize,
}

impl FakePortal {
    pub fn serving(tag: SourceTag, listings: Vec<Listing>) -> Self {
        Self {
            tag,
            answer: Ok(listings),
            latency: Duration::ZERO,
            hits: AtomicUsize::new(0),
        }
    }

    pub fn broken(tag: SourceTag) -> Self {
        Self {
            answer: Err(SourceError::Status(503)),
            ..Self::serving(tag, Vec::new())
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for FakePortal {
    fn tag(&self) -> SourceTag {
        self.tag
    }

    async fn fetch_listings(&self, _params: &QueryParams) -> Result<Vec<Listing>, SourceError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.answer.clone()
    }
}

pub fn flat(tag: SourceTag, id: &str, price: f64, size: f64, location: &str) -> Listing {
    Listing::new(tag, id, format!("https://{tag}.test/{id}"))
        .with_name(format!("Flat {id}"))
        .with_location(location)
        .with_price(Some(price))
        .with_size(Some(size))
}

pub fn distinct_flats(tag: SourceTag, count: usize) -> Vec<Listing> {
    (0..count)
        .map(|i| {
            flat(
                tag,
                &i.to_string(),
                3_000_000.0 + 250_000.0 * i as f64,
                40.0 + 5.0 * i as f64,
                &format!("{tag} district {i}"),
            )
        })
        .collect()
}

pub fn service_with(
    portals: Vec<Arc<FakePortal>>,
    config: &Config,
    reporter: Arc<dyn ProgressReporter>,
) -> SearchService {
    let mut registry = SourceRegistry::new();
    for portal in portals {
        registry.register(portal).expect("portal tags are unique");
    }
    SearchService::new(registry, config, reporter)
}
