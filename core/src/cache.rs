//! # Snapshot Cache
//!
//! Holds the one most recent processed result set for the whole process.
//!
//! The cache is not keyed by query, and any request carrying a parameter
//! bypasses it. Only parameterless requests arriving
//! within the staleness window are answered from the snapshot. Access goes
//! through an async `RwLock`, so a reader sees either the previous snapshot or
//! the complete new one, never something in between.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use domov_common::listing::Listing;
use domov_common::query::QueryParams;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct Snapshot {
    /// Merged listings after grouping, before the per-response sort.
    pub listings: Vec<Listing>,
    pub produced_at: DateTime<Utc>,
    created: Instant,
}

impl Snapshot {
    fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            produced_at: Utc::now(),
            created: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.created.elapsed()
    }
}

pub struct SnapshotCache {
    staleness_window: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotCache {
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            staleness_window,
            current: RwLock::new(None),
        }
    }

    /// Decides whether a request must trigger a fresh fetch.
    ///
    /// True when the request carries any parameter, when nothing (or nothing
    /// but an empty result) has been cached yet, or when the snapshot is older
    /// than the staleness window.
    pub async fn should_refresh(&self, params: &QueryParams) -> bool {
        if !params.is_empty() {
            debug!("Request carries parameters, bypassing cache");
            return true;
        }

        match self.current.read().await.as_ref() {
            None => true,
            Some(snapshot) if snapshot.listings.is_empty() => true,
            Some(snapshot) => {
                let age = snapshot.age();
                debug!(age_secs = age.as_secs(), "Cached snapshot age");
                age > self.staleness_window
            }
        }
    }

    /// The current snapshot, shared rather than copied.
    pub async fn read(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    /// Replaces the snapshot wholesale and stamps it with the current time.
    pub async fn write(&self, listings: Vec<Listing>) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::new(listings));
        *self.current.write().await = Some(Arc::clone(&snapshot));
        snapshot
    }
}
