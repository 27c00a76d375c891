//! Fetch orchestration across source adapters.
//!
//! Every requested source runs as its own tokio task. The orchestrator waits
//! for all of them, then stitches the successful results together in the order
//! the sources were requested, so completion timing never changes the output.
//! A failing, hanging or panicking source only costs its own contribution.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domov_common::listing::{Listing, SourceTag};
use domov_common::progress::ProgressReporter;
use domov_common::query::QueryParams;
use domov_common::source::{SourceAdapter, SourceError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::registry::{ConfigError, SourceRegistry};

/// What a single source contributed to a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Fetched(usize),
    Failed(SourceError),
}

impl SourceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SourceOutcome::Failed(_))
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Fetched(count) => write!(f, "{count}"),
            SourceOutcome::Failed(_) => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Default)]
pub struct FetchReport {
    /// Successful listings, grouped by source in request order.
    pub listings: Vec<Listing>,
    pub outcomes: Vec<(SourceTag, SourceOutcome)>,
}

impl FetchReport {
    pub fn outcome(&self, tag: SourceTag) -> Option<&SourceOutcome> {
        self.outcomes
            .iter()
            .find(|(source, _)| *source == tag)
            .map(|(_, outcome)| outcome)
    }

    pub fn failed_sources(&self) -> Vec<SourceTag> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(tag, _)| *tag)
            .collect()
    }
}

pub struct FetchOrchestrator {
    registry: SourceRegistry,
    reporter: Arc<dyn ProgressReporter>,
    /// Per-task deadline; `None` waits for the adapter however long it takes.
    deadline: Option<Duration>,
}

impl FetchOrchestrator {
    pub fn new(
        registry: SourceRegistry,
        reporter: Arc<dyn ProgressReporter>,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            reporter,
            deadline,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Queries every distinct source in `sources` concurrently and merges the
    /// results.
    ///
    /// Only an unconfigured tag is an error, and it is raised before any
    /// adapter runs. Source failures are recorded in the report instead.
    pub async fn fetch(
        &self,
        sources: &[SourceTag],
        params: &QueryParams,
    ) -> Result<FetchReport, ConfigError> {
        let adapters = self.registry.resolve(sources)?;
        if adapters.is_empty() {
            debug!("No sources requested, skipping fetch");
            return Ok(FetchReport::default());
        }

        let handles: Vec<(SourceTag, JoinHandle<Result<Vec<Listing>, SourceError>>)> = adapters
            .into_iter()
            .map(|(tag, adapter)| (tag, self.spawn_source(tag, adapter, params.clone())))
            .collect();

        let mut report = FetchReport::default();
        for (tag, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(listings)) => {
                    let count = listings.len();
                    report
                        .listings
                        .extend(listings.into_iter().map(|listing| stamp(tag, listing)));
                    SourceOutcome::Fetched(count)
                }
                Ok(Err(e)) => SourceOutcome::Failed(e),
                Err(join_err) => {
                    // The task never reached its own report, so report here.
                    warn!(source = %tag, error = %join_err, "Source task aborted");
                    let e = SourceError::Aborted(join_err.to_string());
                    self.reporter.error(&format!("{tag} failed: {e}"));
                    SourceOutcome::Failed(e)
                }
            };
            report.outcomes.push((tag, outcome));
        }

        self.reporter.info(&summary_message(&report));
        info!(
            total = report.listings.len(),
            failed = report.failed_sources().len(),
            "Fetch complete"
        );

        Ok(report)
    }

    fn spawn_source(
        &self,
        tag: SourceTag,
        adapter: Arc<dyn SourceAdapter>,
        params: QueryParams,
    ) -> JoinHandle<Result<Vec<Listing>, SourceError>> {
        let reporter = Arc::clone(&self.reporter);
        let deadline = self.deadline;

        tokio::spawn(async move {
            debug!(source = %tag, "Fetching listings");
            let result = match deadline {
                Some(limit) => tokio::time::timeout(limit, adapter.fetch_listings(&params))
                    .await
                    .unwrap_or_else(|_| Err(SourceError::TimedOut(limit))),
                None => adapter.fetch_listings(&params).await,
            };

            match &result {
                Ok(listings) => {
                    info!(source = %tag, count = listings.len(), "Source fetch complete");
                    reporter.info(&format!("{tag}: found {} listings", listings.len()));
                }
                Err(e) => {
                    warn!(source = %tag, error = %e, "Source fetch failed");
                    reporter.error(&format!("{tag} failed: {e}"));
                }
            }
            result
        })
    }
}

/// Enforces the listing invariants the rest of the pipeline relies on.
fn stamp(tag: SourceTag, mut listing: Listing) -> Listing {
    if listing.source != tag {
        warn!(expected = %tag, found = %listing.source, id = %listing.id, "Restamping listing source");
        listing.source = tag;
    }
    listing.refresh_price_per_meter();
    listing
}

fn summary_message(report: &FetchReport) -> String {
    let per_source: Vec<String> = report
        .outcomes
        .iter()
        .map(|(tag, outcome)| format!("{tag}: {outcome}"))
        .collect();
    format!(
        "Search completed: {} listings total ({})",
        report.listings.len(),
        per_source.join(", ")
    )
}
