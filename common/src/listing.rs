//! # Listing Model
//!
//! The normalized record every source adapter produces and the core consumes.
//!
//! Numeric fields that a source may not know (`size`, `price`) are modelled as
//! `Option`s rather than sentinels, and `price_per_meter` is always derived
//! from them through [`Listing::refresh_price_per_meter`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of providers the aggregator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Sreality,
    Idnes,
    Remax,
    Bezrealitky,
}

impl SourceTag {
    pub const ALL: [SourceTag; 4] = [
        SourceTag::Sreality,
        SourceTag::Idnes,
        SourceTag::Remax,
        SourceTag::Bezrealitky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Sreality => "sreality",
            SourceTag::Idnes => "idnes",
            SourceTag::Remax => "remax",
            SourceTag::Bezrealitky => "bezrealitky",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SourceTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == lower)
            .ok_or_else(|| format!("unknown source: {s}"))
    }
}

/// Visual marker shared by all members of one duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Yellow,
    Blue,
    Green,
    Purple,
    Pink,
    Orange,
    Teal,
    Red,
}

impl GroupColor {
    pub const PALETTE: [GroupColor; 8] = [
        GroupColor::Yellow,
        GroupColor::Blue,
        GroupColor::Green,
        GroupColor::Purple,
        GroupColor::Pink,
        GroupColor::Orange,
        GroupColor::Teal,
        GroupColor::Red,
    ];

    /// Color of the `index`-th duplicate group, wrapping around the palette.
    pub fn nth(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Namespaced as `<source>-<source id>` so ids never collide across sources.
    pub id: String,
    pub url: String,
    pub name: String,
    pub location: String,
    /// Usable area in m².
    pub size: Option<f64>,
    pub price: Option<f64>,
    pub price_per_meter: Option<i64>,
    pub images: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub source: SourceTag,
    pub group_color: Option<GroupColor>,
    /// Size of the duplicate group, unset for listings without duplicates.
    pub duplicate_count: Option<usize>,
}

impl Listing {
    pub fn new(source: SourceTag, raw_id: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            id: format!("{source}-{}", raw_id.as_ref()),
            url: url.into(),
            name: String::new(),
            location: String::new(),
            size: None,
            price: None,
            price_per_meter: None,
            images: Vec::new(),
            timestamp: Utc::now(),
            source,
            group_color: None,
            duplicate_count: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_size(mut self, size: Option<f64>) -> Self {
        self.size = size;
        self.refresh_price_per_meter();
        self
    }

    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self.refresh_price_per_meter();
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// Re-derives `price_per_meter` from `price` and `size`.
    pub fn refresh_price_per_meter(&mut self) {
        self.price_per_meter = price_per_meter(self.price, self.size);
    }
}

/// `round(price / size)`, or `None` unless both are finite and size is non-zero.
pub fn price_per_meter(price: Option<f64>, size: Option<f64>) -> Option<i64> {
    match (price, size) {
        (Some(price), Some(size)) if price.is_finite() && size.is_finite() && size != 0.0 => {
            Some((price / size).round() as i64)
        }
        _ => None,
    }
}
