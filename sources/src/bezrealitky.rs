//! Adapter for the bezrealitky.cz GraphQL API.

use async_trait::async_trait;
use domov_common::listing::{Listing, SourceTag};
use domov_common::query::{City, QueryParams};
use domov_common::source::{SourceAdapter, SourceError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::http;

const GRAPHQL_URL: &str = "https://api.bezrealitky.cz/graphql/";
const SITE_URL: &str = "https://www.bezrealitky.cz";
const PAGE_LIMIT: u32 = 100;

// Bounds sent when the caller leaves them open.
const DEFAULT_PRICE_FROM: u64 = 5_000_000;
const DEFAULT_PRICE_TO: u64 = 10_000_000;
const DEFAULT_SURFACE_FROM: u32 = 50;
const DEFAULT_SURFACE_TO: u32 = 100;

const ADVERT_LIST_QUERY: &str = r#"
query AdvertList($locale: Locale!, $estateType: [EstateType], $offerType: [OfferType], $ownership: [Ownership],
  $priceFrom: Int, $priceTo: Int, $surfaceFrom: Int, $surfaceTo: Int, $regionOsmIds: [ID],
  $limit: Int = 15, $offset: Int = 0, $order: ResultOrder = TIMEORDER_DESC, $currency: Currency) {
  listAdverts(
    offerType: $offerType
    estateType: $estateType
    ownership: $ownership
    priceFrom: $priceFrom
    priceTo: $priceTo
    surfaceFrom: $surfaceFrom
    surfaceTo: $surfaceTo
    regionOsmIds: $regionOsmIds
    limit: $limit
    offset: $offset
    order: $order
    currency: $currency
  ) {
    list {
      id
      uri
      mainImage { url(filter: RECORD_MAIN) }
      publicImages(limit: 10) { url(filter: RECORD_MAIN) }
      address(locale: $locale)
      surface
      price
    }
    totalCount
  }
}
"#;

pub struct BezrealitkyAdapter {
    client: Client,
}

impl BezrealitkyAdapter {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            client: http::client()?,
        })
    }
}

#[async_trait]
impl SourceAdapter for BezrealitkyAdapter {
    fn tag(&self) -> SourceTag {
        SourceTag::Bezrealitky
    }

    async fn fetch_listings(&self, params: &QueryParams) -> Result<Vec<Listing>, SourceError> {
        let response = self
            .client
            .post(GRAPHQL_URL)
            .header("Accept", "application/json")
            .header("Accept-Language", "cs")
            .header("Origin", SITE_URL)
            .header("Referer", format!("{SITE_URL}/"))
            .json(&request_body(params))
            .send()
            .await
            .map_err(http::to_source_error)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body: GraphqlResponse = response.json().await.map_err(http::to_source_error)?;
        let listings = parse_response(body)?;
        debug!(count = listings.len(), "Parsed bezrealitky adverts");
        Ok(listings)
    }
}

fn region_osm_id(city: City) -> &'static str {
    match city {
        City::Praha => "R435514",
        City::Brno => "R442169",
        City::Ostrava => "R436453",
    }
}

fn request_body(params: &QueryParams) -> Value {
    json!({
        "operationName": "AdvertList",
        "query": ADVERT_LIST_QUERY,
        "variables": {
            "limit": PAGE_LIMIT,
            "offset": 0,
            "order": "TIMEORDER_DESC",
            "locale": "CS",
            "offerType": ["PRODEJ"],
            "estateType": ["BYT"],
            "ownership": ["OSOBNI"],
            "priceFrom": params.price_from.unwrap_or(DEFAULT_PRICE_FROM),
            "priceTo": params.price_to.unwrap_or(DEFAULT_PRICE_TO),
            "surfaceFrom": params.size_from.unwrap_or(DEFAULT_SURFACE_FROM),
            "surfaceTo": params.size_to.unwrap_or(DEFAULT_SURFACE_TO),
            "regionOsmIds": [region_osm_id(params.city())],
            "location": "exact",
            "currency": "CZK",
        }
    })
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<AdvertListData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvertListData {
    list_adverts: Option<AdvertList>,
}

#[derive(Debug, Deserialize)]
struct AdvertList {
    #[serde(default)]
    list: Vec<Advert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Advert {
    id: Value,
    #[serde(default)]
    uri: String,
    address: Option<String>,
    surface: Option<f64>,
    price: Option<f64>,
    main_image: Option<Image>,
    #[serde(default)]
    public_images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: Option<String>,
}

fn parse_response(body: GraphqlResponse) -> Result<Vec<Listing>, SourceError> {
    if let Some(error) = body.errors.first() {
        return Err(SourceError::UnexpectedShape(error.message.clone()));
    }
    let adverts = body
        .data
        .and_then(|d| d.list_adverts)
        .map(|l| l.list)
        .unwrap_or_default();
    Ok(adverts.into_iter().map(to_listing).collect())
}

fn to_listing(advert: Advert) -> Listing {
    let id = match &advert.id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let images = advert
        .main_image
        .into_iter()
        .chain(advert.public_images)
        .filter_map(|image| image.url)
        .collect();
    let address = advert.address.unwrap_or_default();
    let name = if address.is_empty() {
        "Untitled listing".to_string()
    } else {
        address.clone()
    };

    Listing::new(SourceTag::Bezrealitky, id, format!("{SITE_URL}{}", advert.uri))
        .with_name(name)
        .with_location(address)
        .with_price(advert.price.filter(|p| *p > 0.0))
        .with_size(advert.surface.filter(|s| *s > 0.0))
        .with_images(images)
}
