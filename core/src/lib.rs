//! The aggregation, resilience and deduplication pipeline.
//!
//! - [`registry`]: resolves source tags to adapters.
//! - [`orchestrator`]: fans a query out to the adapters and merges what comes back.
//! - [`cache`]: the single shared snapshot of the last processed result.
//! - [`grouping`]: clusters near-duplicate listings and moves clusters to the front.
//! - [`ranking`]: final price-per-meter ordering and per-source statistics.
//! - [`search`]: the request-level service wiring all of the above together.

pub mod cache;
pub mod grouping;
pub mod orchestrator;
pub mod ranking;
pub mod registry;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;
