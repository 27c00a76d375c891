//! # Source Adapter Port
//!
//! The contract every data provider implements. The core only ever sees
//! `dyn SourceAdapter`; how a provider is queried (JSON API, GraphQL, scraping)
//! stays behind this trait.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::listing::{Listing, SourceTag};
use crate::query::QueryParams;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The tag stamped on every listing this adapter returns.
    fn tag(&self) -> SourceTag;

    /// Retrieves listings matching `params`.
    ///
    /// An empty result is `Ok(vec![])`, never an error.
    async fn fetch_listings(&self, params: &QueryParams) -> Result<Vec<Listing>, SourceError>;
}

/// Why a single source contributed nothing to a search.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unexpected data shape: {0}")]
    UnexpectedShape(String),
    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
    #[error("task aborted: {0}")]
    Aborted(String),
}
