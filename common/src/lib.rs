//! Shared vocabulary of the `domov` workspace.
//!
//! Everything the aggregation pipeline and its collaborators exchange lives here:
//! the [`listing::Listing`] record, the closed set of [`listing::SourceTag`]s, the
//! search [`query::QueryParams`], and the two outbound ports the core talks
//! through ([`source::SourceAdapter`] and [`progress::ProgressReporter`]).

pub mod config;
pub mod listing;
pub mod progress;
pub mod query;
pub mod source;
