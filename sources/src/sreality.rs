//! Adapter for the sreality.cz public estates API.
//!
//! The API is paginated; pages are fetched sequentially until the reported
//! total is exhausted or [`MAX_PAGES`] is reached.

use std::sync::LazyLock;

use async_trait::async_trait;
use domov_common::listing::{Listing, SourceTag};
use domov_common::query::{City, QueryParams};
use domov_common::source::{SourceAdapter, SourceError};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http;

const ESTATES_URL: &str = "https://www.sreality.cz/api/cs/v2/estates";
const DETAIL_URL: &str = "https://www.sreality.cz/detail/prodej/byt";
const PER_PAGE: u64 = 100;
const MAX_PAGES: u64 = 10;
const AREA_ITEM_NAMES: [&str; 3] = ["Užitná plocha", "Podlahová plocha", "Plocha podlahová"];

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());
static AREA_IN_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*m²").unwrap());
static LAYOUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\d\+\d|\d\+kk").unwrap());

pub struct SrealityAdapter {
    client: Client,
}

impl SrealityAdapter {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            client: http::client()?,
        })
    }

    async fn fetch_page(&self, params: &QueryParams, page: u64) -> Result<EstatesPage, SourceError> {
        let response = self
            .client
            .get(ESTATES_URL)
            .header("Accept", "application/json")
            .query(&search_params(params, page))
            .send()
            .await
            .map_err(http::to_source_error)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        response.json().await.map_err(http::to_source_error)
    }
}

#[async_trait]
impl SourceAdapter for SrealityAdapter {
    fn tag(&self) -> SourceTag {
        SourceTag::Sreality
    }

    async fn fetch_listings(&self, params: &QueryParams) -> Result<Vec<Listing>, SourceError> {
        let mut listings = Vec::new();
        let mut page = 1;

        loop {
            debug!(page, "Fetching sreality page");
            let body = self.fetch_page(params, page).await?;
            let Some(estates) = body.embedded.map(|e| e.estates) else {
                debug!(page, "No estates in sreality response");
                break;
            };

            let (parsed, skipped) = parse_estates(estates);
            if skipped > 0 {
                warn!(page, skipped, "Skipped malformed sreality estates");
            }
            listings.extend(parsed);

            if page * PER_PAGE >= body.total || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }

        Ok(listings)
    }
}

fn region_id(city: City) -> u32 {
    match city {
        City::Praha => 10,
        City::Brno => 2,
        City::Ostrava => 8,
    }
}

fn search_params(params: &QueryParams, page: u64) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("category_main_cb", "1".to_string()),
        ("category_type_cb", "1".to_string()),
        ("category_sub_cb", "2|3".to_string()),
        ("per_page", PER_PAGE.to_string()),
        ("page", page.to_string()),
        ("locality_region_id", region_id(params.city()).to_string()),
    ];
    let bounds = [
        ("usable_area_from", params.size_from.map(u64::from)),
        ("usable_area_to", params.size_to.map(u64::from)),
        ("price_from", params.price_from),
        ("price_to", params.price_to),
    ];
    query.extend(
        bounds
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
    );
    query
}

#[derive(Debug, Deserialize)]
struct EstatesPage {
    #[serde(default)]
    total: u64,
    #[serde(rename = "_embedded")]
    embedded: Option<Embedded>,
}

#[derive(Debug, Deserialize)]
struct Embedded {
    #[serde(default)]
    estates: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Estate {
    hash_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    locality: String,
    locality_district: Option<String>,
    usable_area: Option<f64>,
    #[serde(default)]
    items: Vec<EstateItem>,
    price_czk: Option<Price>,
    #[serde(rename = "_links")]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct EstateItem {
    name: String,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct Price {
    value_raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Links {
    #[serde(default)]
    images: Vec<Href>,
}

#[derive(Debug, Deserialize)]
struct Href {
    href: String,
}

/// Decodes each estate on its own so one bad record doesn't sink the page.
fn parse_estates(estates: Vec<Value>) -> (Vec<Listing>, usize) {
    let total = estates.len();
    let listings: Vec<Listing> = estates
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<Estate>(raw).ok())
        .map(to_listing)
        .collect();
    let skipped = total - listings.len();
    (listings, skipped)
}

fn to_listing(estate: Estate) -> Listing {
    let size = estate_size(&estate);
    let url = detail_url(&estate);
    let images = estate
        .links
        .map(|links| links.images.into_iter().map(|i| i.href).collect())
        .unwrap_or_default();

    Listing::new(SourceTag::Sreality, estate.hash_id.to_string(), url)
        .with_name(estate.name)
        .with_location(estate.locality)
        .with_price(estate.price_czk.and_then(|p| p.value_raw))
        .with_size(size)
        .with_images(images)
}

/// `usable_area`, else an area item, else `NN m²` in the title.
fn estate_size(estate: &Estate) -> Option<f64> {
    if let Some(area) = estate.usable_area.filter(|a| *a > 0.0) {
        return Some(area);
    }

    let from_items = estate
        .items
        .iter()
        .find(|item| AREA_ITEM_NAMES.contains(&item.name.as_str()))
        .and_then(|item| match &item.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => first_number(&FIRST_NUMBER, s),
            _ => None,
        });
    if from_items.is_some() {
        return from_items;
    }

    first_number(&AREA_IN_NAME, &estate.name)
}

fn first_number(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn detail_url(estate: &Estate) -> String {
    let layout = LAYOUT
        .find(&estate.name)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();
    let district = estate
        .locality_district
        .as_deref()
        .unwrap_or_default()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{DETAIL_URL}/{layout}/{district}/{}", estate.hash_id)
}
