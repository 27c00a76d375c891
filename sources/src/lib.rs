//! Concrete [`SourceAdapter`](domov_common::source::SourceAdapter)s for the
//! providers reachable over plain HTTP.
//!
//! Providers that can only be read through a rendered page (idnes, remax) have
//! no adapter here.

mod http;

pub mod bezrealitky;
pub mod sreality;

pub use bezrealitky::BezrealitkyAdapter;
pub use sreality::SrealityAdapter;
