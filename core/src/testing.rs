use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use domov_common::listing::{Listing, SourceTag};
use domov_common::query::QueryParams;
use domov_common::source::{SourceAdapter, SourceError};

enum Script {
    Listings(Vec<Listing>),
    Fail(String),
    Panic,
}

/// Adapter with a canned answer that counts how often it was asked.
pub struct ScriptedAdapter {
    tag: SourceTag,
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    fn build(tag: SourceTag, script: Script) -> Self {
        Self {
            tag,
            script,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(tag: SourceTag, count: usize) -> Arc<Self> {
        let listings = (0..count).map(|i| sample(tag, i)).collect();
        Arc::new(Self::build(tag, Script::Listings(listings)))
    }

    pub fn returning(tag: SourceTag, listings: Vec<Listing>) -> Arc<Self> {
        Arc::new(Self::build(tag, Script::Listings(listings)))
    }

    pub fn failing(tag: SourceTag, reason: &str) -> Arc<Self> {
        Arc::new(Self::build(tag, Script::Fail(reason.to_string())))
    }

    pub fn panicking(tag: SourceTag) -> Arc<Self> {
        Arc::new(Self::build(tag, Script::Panic))
    }

    /// Only valid on a freshly built adapter.
    pub fn delayed(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        let mut inner = Arc::try_unwrap(self).unwrap_or_else(|_| panic!("adapter already shared"));
        inner.delay = Some(delay);
        Arc::new(inner)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
    fn tag(&self) -> SourceTag {
        self.tag
    }

    async fn fetch_listings(&self, _params: &QueryParams) -> Result<Vec<Listing>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Listings(listings) => Ok(listings.clone()),
            Script::Fail(reason) => Err(SourceError::Network(reason.clone())),
            Script::Panic => panic!("scripted adapter panic"),
        }
    }
}

/// A distinct listing per `(tag, i)` that never groups with another.
pub fn sample(tag: SourceTag, i: usize) -> Listing {
    Listing::new(tag, i.to_string(), format!("https://{tag}.test/{i}"))
        .with_location(format!("{tag} street {i}"))
        .with_price(Some(2_000_000.0 + 100_000.0 * i as f64))
        .with_size(Some(50.0 + i as f64))
}

pub fn listing(tag: SourceTag, id: &str, price: Option<f64>, size: Option<f64>, location: &str) -> Listing {
    Listing::new(tag, id, format!("https://{tag}.test/{id}"))
        .with_location(location)
        .with_price(price)
        .with_size(size)
}
