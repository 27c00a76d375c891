//! # Duplicate Grouping
//!
//! Clusters listings that most likely describe the same property and moves
//! those clusters to the front of the result.
//!
//! Two listings are treated as the same property when they share a
//! [`GroupKey`]: price rounded to the nearest 10 000, size rounded to the
//! nearest m², and the location text after normalization. The same flat
//! advertised by an agency and by its owner at a slightly different asking
//! price lands in one group.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use domov_common::listing::{GroupColor, Listing, SourceTag};
use domov_common::progress::ProgressReporter;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const PRICE_BUCKET: f64 = 10_000.0;

/// Approximate identity of a listing.
///
/// A missing, non-finite or out-of-range price or size becomes `None`, so
/// such listings only group with listings missing the same component at the
/// same location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub price_bucket: Option<i64>,
    pub size: Option<i64>,
    pub location: String,
}

impl GroupKey {
    pub fn of(listing: &Listing) -> Self {
        Self {
            price_bucket: round_finite(listing.price.map(|p| p / PRICE_BUCKET))
                .and_then(|bucket| bucket.checked_mul(PRICE_BUCKET as i64)),
            size: round_finite(listing.size),
            location: normalize_location(&listing.location),
        }
    }
}

/// Rounds half away from zero; values `i64` can't hold become `None`.
fn round_finite(value: Option<f64>) -> Option<i64> {
    value
        .map(f64::round)
        .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

/// Strips diacritics, lower-cases, and collapses whitespace runs.
///
/// `"  Praha 1 -  Staré Město "` becomes `"praha 1 - stare mesto"`.
pub fn normalize_location(location: &str) -> String {
    let folded: String = location
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub key: GroupKey,
    pub members: Vec<Listing>,
    pub color: Option<GroupColor>,
}

impl DuplicateGroup {
    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }

    pub fn sources(&self) -> Vec<SourceTag> {
        self.members.iter().map(|l| l.source).collect()
    }
}

/// Buckets listings by key, keeping first-seen order of groups and members,
/// and colors duplicate groups round-robin in that order.
pub fn group_listings(listings: Vec<Listing>) -> Vec<DuplicateGroup> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for listing in listings {
        let key = GroupKey::of(&listing);
        match index.get(&key) {
            Some(&slot) => groups[slot].members.push(listing),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key,
                    members: vec![listing],
                    color: None,
                });
            }
        }
    }

    let mut palette_index = 0;
    for group in groups.iter_mut().filter(|g| g.is_duplicate()) {
        group.color = Some(GroupColor::nth(palette_index));
        palette_index += 1;
    }

    groups
}

/// Duplicates first, singletons after, each side in encounter order.
pub fn prioritize_duplicates(groups: Vec<DuplicateGroup>) -> Vec<DuplicateGroup> {
    let (mut duplicates, singletons): (Vec<_>, Vec<_>) =
        groups.into_iter().partition(|g| g.color.is_some());
    duplicates.extend(singletons);
    duplicates
}

/// Stamps group metadata onto the members and concatenates the groups.
pub fn flatten(groups: Vec<DuplicateGroup>) -> Vec<Listing> {
    groups
        .into_iter()
        .flat_map(|group| {
            let count = group.is_duplicate().then_some(group.members.len());
            let color = group.color;
            group.members.into_iter().map(move |mut listing| {
                listing.group_color = color;
                listing.duplicate_count = count;
                listing
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupSummary {
    /// Listings without any duplicate.
    pub unique_listings: usize,
    /// Listings that belong to some duplicate group.
    pub duplicate_listings: usize,
    pub duplicate_groups: usize,
    /// Source composition of each duplicate group.
    pub compositions: Vec<Vec<SourceTag>>,
}

impl DedupSummary {
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        let duplicates: Vec<&DuplicateGroup> = groups.iter().filter(|g| g.is_duplicate()).collect();
        Self {
            unique_listings: groups.len() - duplicates.len(),
            duplicate_listings: duplicates.iter().map(|g| g.members.len()).sum(),
            duplicate_groups: duplicates.len(),
            compositions: duplicates.iter().map(|g| g.sources()).collect(),
        }
    }
}

impl fmt::Display for DedupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Duplicate analysis:")?;
        writeln!(f, "Total unique listings: {}", self.unique_listings)?;
        writeln!(f, "Total duplicate listings: {}", self.duplicate_listings)?;
        write!(f, "Number of duplicate groups: {}", self.duplicate_groups)?;
        for sources in &self.compositions {
            let names: Vec<&str> = sources.iter().map(SourceTag::as_str).collect();
            write!(f, "\nGroup of {} listings: {}", sources.len(), names.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct GroupingEngine {
    reporter: Arc<dyn ProgressReporter>,
}

impl GroupingEngine {
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { reporter }
    }

    /// Groups, orders and annotates `listings`.
    ///
    /// The output is a reordering of the input: nothing is added or dropped.
    pub fn process(&self, listings: Vec<Listing>) -> Vec<Listing> {
        if listings.is_empty() {
            return Vec::new();
        }

        let groups = group_listings(listings);
        let summary = DedupSummary::from_groups(&groups);
        debug!(
            unique = summary.unique_listings,
            duplicates = summary.duplicate_listings,
            groups = summary.duplicate_groups,
            "Grouped listings"
        );
        self.reporter.info(&summary.to_string());

        flatten(prioritize_duplicates(groups))
    }
}
