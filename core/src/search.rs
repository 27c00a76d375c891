//! # Search Service
//!
//! The request-level use case: decide between cache and fresh fetch, run the
//! fetch and grouping pipeline when needed, then sort and summarize.
//!
//! One `SearchService` is created at startup and shared by every request; it
//! owns the snapshot cache, so the cache lives exactly as long as the service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domov_common::config::Config;
use domov_common::listing::{Listing, SourceTag};
use domov_common::progress::ProgressReporter;
use domov_common::query::{City, QueryParams};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::cache::{Snapshot, SnapshotCache};
use crate::grouping::GroupingEngine;
use crate::orchestrator::{FetchOrchestrator, SourceOutcome};
use crate::ranking::{SourceStats, sort_by_price_per_meter};
use crate::registry::{ConfigError, SourceRegistry};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Carries no detail; internal state never reaches callers.
    #[error("failed to process listings")]
    Internal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub listings: Vec<Listing>,
    /// When the underlying snapshot was produced.
    pub timestamp: DateTime<Utc>,
    pub count: usize,
    pub stats: SourceStats,
    pub search_params: QueryParams,
    #[serde(skip)]
    pub from_cache: bool,
    /// Per-source outcomes of the fetch; empty when served from cache.
    #[serde(skip)]
    pub outcomes: Vec<(SourceTag, SourceOutcome)>,
}

pub struct SearchService {
    orchestrator: FetchOrchestrator,
    grouping: GroupingEngine,
    cache: SnapshotCache,
    reporter: Arc<dyn ProgressReporter>,
    default_location: City,
}

impl SearchService {
    pub fn new(registry: SourceRegistry, config: &Config, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(
                registry,
                Arc::clone(&reporter),
                config.source_deadline,
            ),
            grouping: GroupingEngine::new(Arc::clone(&reporter)),
            cache: SnapshotCache::new(config.staleness_window),
            reporter,
            default_location: config.default_location,
        }
    }

    pub fn configured_sources(&self) -> Vec<SourceTag> {
        self.orchestrator.registry().tags()
    }

    /// Runs one search.
    ///
    /// Source failures never surface here; only a bad source selection or an
    /// internal fault in processing does.
    pub async fn search(&self, params: QueryParams) -> Result<SearchResponse, SearchError> {
        let configured = self.configured_sources();
        let effective = params.with_defaults(self.default_location, &configured);

        if !self.cache.should_refresh(&params).await {
            if let Some(snapshot) = self.cache.read().await {
                info!(
                    listings = snapshot.listings.len(),
                    age_secs = snapshot.age().as_secs(),
                    "Serving cached snapshot"
                );
                return Ok(respond(&snapshot, &configured, effective, true, Vec::new()));
            }
        }

        info!(params = ?effective, "Fetching fresh listings");
        self.reporter
            .info("Starting property search for selected sources...");

        let sources = effective.sources.clone().unwrap_or_default();
        let report = self.orchestrator.fetch(&sources, &effective).await?;

        let grouping = self.grouping.clone();
        let listings = report.listings;
        let processed = tokio::task::spawn_blocking(move || grouping.process(listings))
            .await
            .map_err(|e| {
                error!(error = %e, "Listing processing failed");
                self.reporter.error("Search failed: internal error while processing listings");
                SearchError::Internal
            })?;

        let snapshot = self.cache.write(processed).await;
        Ok(respond(&snapshot, &configured, effective, false, report.outcomes))
    }
}

fn respond(
    snapshot: &Snapshot,
    configured: &[SourceTag],
    search_params: QueryParams,
    from_cache: bool,
    outcomes: Vec<(SourceTag, SourceOutcome)>,
) -> SearchResponse {
    let mut listings = snapshot.listings.clone();
    sort_by_price_per_meter(&mut listings);
    let stats = SourceStats::compute(&listings, configured);

    SearchResponse {
        count: listings.len(),
        listings,
        timestamp: snapshot.produced_at,
        stats,
        search_params,
        from_cache,
        outcomes,
    }
}
