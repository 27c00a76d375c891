//! # Search Query Model
//!
//! Parsing and representation of the filters a caller may attach to a search.
//!
//! Accepted keys:
//! * `location`: one of `praha`, `brno`, `ostrava` (case-insensitive).
//! * `sizeFrom` / `sizeTo`: usable area bounds in m².
//! * `priceFrom` / `priceTo`: price bounds.
//! * `sources`: comma separated source tags, e.g. `sreality,idnes`.
//!
//! Whether a request carried *any* key at all matters to the snapshot cache,
//! so every field stays `None` until the caller supplies it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::listing::SourceTag;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    #[default]
    Praha,
    Brno,
    Ostrava,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Praha => "praha",
            City::Brno => "brno",
            City::Ostrava => "ostrava",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for City {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "praha" => Ok(City::Praha),
            "brno" => Ok(City::Brno),
            "ostrava" => Ok(City::Ostrava),
            _ => Err(QueryError::UnknownLocation(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown query parameter '{0}'")]
    UnknownParameter(String),
    #[error("'{key}' must be a non-negative whole number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("unknown location '{0}' (expected praha, brno or ostrava)")]
    UnknownLocation(String),
    #[error("unknown source '{0}'")]
    UnknownSource(String),
    #[error("'sources' must name at least one source")]
    EmptySources,
    #[error("{lower} is greater than {upper}")]
    InvertedRange {
        lower: &'static str,
        upper: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<City>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_from: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_to: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceTag>>,
}

impl QueryParams {
    /// Builds params from raw `key=value` pairs as they arrive from a query string.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = QueryParams::default();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "location" => params.location = Some(value.parse()?),
                "sizeFrom" => params.size_from = Some(parse_number("sizeFrom", value)?),
                "sizeTo" => params.size_to = Some(parse_number("sizeTo", value)?),
                "priceFrom" => params.price_from = Some(parse_number("priceFrom", value)?),
                "priceTo" => params.price_to = Some(parse_number("priceTo", value)?),
                "sources" => params.sources = Some(parse_sources(value)?),
                other => return Err(QueryError::UnknownParameter(other.to_string())),
            }
        }

        params.validate()?;
        Ok(params)
    }

    /// Rejects bounds where the lower end exceeds the upper end.
    pub fn validate(&self) -> Result<(), QueryError> {
        if let (Some(from), Some(to)) = (self.size_from, self.size_to) {
            if from > to {
                return Err(QueryError::InvertedRange {
                    lower: "sizeFrom",
                    upper: "sizeTo",
                });
            }
        }
        if let (Some(from), Some(to)) = (self.price_from, self.price_to) {
            if from > to {
                return Err(QueryError::InvertedRange {
                    lower: "priceFrom",
                    upper: "priceTo",
                });
            }
        }
        Ok(())
    }

    /// True when the caller supplied no parameter at all.
    pub fn is_empty(&self) -> bool {
        *self == QueryParams::default()
    }

    /// Copy of these params with the default city and source set filled in.
    pub fn with_defaults(&self, default_location: City, default_sources: &[SourceTag]) -> Self {
        Self {
            location: Some(self.location.unwrap_or(default_location)),
            sources: Some(
                self.sources
                    .clone()
                    .unwrap_or_else(|| default_sources.to_vec()),
            ),
            ..self.clone()
        }
    }

    pub fn city(&self) -> City {
        self.location.unwrap_or_default()
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, QueryError> {
    value.trim().parse().map_err(|_| QueryError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

/// Parses `a,b,c`, dropping repeated tags while keeping first-seen order.
pub fn parse_sources(value: &str) -> Result<Vec<SourceTag>, QueryError> {
    let mut tags = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let tag: SourceTag = part
            .parse()
            .map_err(|_| QueryError::UnknownSource(part.to_string()))?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    if tags.is_empty() {
        return Err(QueryError::EmptySources);
    }
    Ok(tags)
}
