//! Final ordering of a result set and the per-source statistics reported with it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use domov_common::listing::{Listing, SourceTag};
use serde::Serialize;

/// Orders by ascending price per m², listings without one last.
///
/// The sort is stable: ties keep the order produced by duplicate grouping.
pub fn sort_by_price_per_meter(listings: &mut [Listing]) {
    listings.sort_by(|a, b| compare_price_per_meter(a.price_per_meter, b.price_per_meter));
}

fn compare_price_per_meter(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub total: usize,
    /// One entry per configured source, zero included.
    #[serde(flatten)]
    pub per_source: BTreeMap<SourceTag, usize>,
}

impl SourceStats {
    pub fn compute(listings: &[Listing], configured: &[SourceTag]) -> Self {
        let per_source = configured
            .iter()
            .map(|tag| (*tag, listings.iter().filter(|l| l.source == *tag).count()))
            .collect();
        Self {
            total: listings.len(),
            per_source,
        }
    }

    pub fn count(&self, tag: SourceTag) -> usize {
        self.per_source.get(&tag).copied().unwrap_or(0)
    }
}
