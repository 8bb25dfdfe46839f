use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::CatalogSource;
use crate::config::{CatalogConfig, Credentials};
use crate::error::FetchError;
use crate::state::Listing;

/// One row of `GET /items`. Prices are in cents.
#[derive(Debug, Deserialize)]
pub struct CatalogItem {
    pub market_hash_name: Option<String>,
    pub min_price: Option<i64>,
    pub suggested_price: Option<i64>,
    pub tradable: Option<bool>,
    pub item_page: Option<String>,
    pub market_page: Option<String>,
}

impl CatalogItem {
    /// Rows without a name can't be matched; drop them.
    pub fn into_listing(self) -> Option<Listing> {
        let name = self.market_hash_name.filter(|n| !n.trim().is_empty())?;
        Some(Listing {
            name,
            min_price: self.min_price,
            suggested_price: self.suggested_price,
            tradable: self.tradable,
            page_url: self.item_page.or(self.market_page),
        })
    }
}

/// Decode a raw `/items` body into listings.
/// Returns the listings and how many nameless rows were dropped.
pub fn decode_catalog(body: &mut [u8]) -> Result<(Vec<Listing>, usize), FetchError> {
    let items: Vec<CatalogItem> = simd_json::from_slice(body)?;
    let total = items.len();
    let listings: Vec<Listing> = items.into_iter().filter_map(CatalogItem::into_listing).collect();
    let dropped = total - listings.len();
    Ok((listings, dropped))
}

/// HTTP transport for the Skinport items endpoint.
pub struct SkinportClient {
    http: reqwest::Client,
    config: CatalogConfig,
    credentials: Credentials,
}

impl SkinportClient {
    pub fn new(config: CatalogConfig, credentials: Credentials) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.basic_auth().is_some()
    }

    /// Final request URL: the items endpoint, optionally wrapped by the relay.
    pub fn items_url(&self) -> Result<Url, FetchError> {
        let base = format!("{}/items", self.config.base_url.trim_end_matches('/'));
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(app_id) = self.config.app_id {
            params.push(("app_id", app_id.to_string()));
        }
        if let Some(currency) = &self.config.currency {
            params.push(("currency", currency.clone()));
        }
        let mut target = Url::parse(&base).map_err(bad_url)?;
        if !params.is_empty() {
            target.query_pairs_mut().extend_pairs(&params);
        }

        match &self.config.relay_url {
            Some(relay) => {
                Url::parse_with_params(relay, &[("url", target.as_str())]).map_err(bad_url)
            }
            None => Ok(target),
        }
    }
}

fn bad_url(err: impl std::fmt::Display) -> FetchError {
    FetchError::Decode(format!("invalid catalog URL: {}", err))
}

#[async_trait]
impl CatalogSource for SkinportClient {
    async fn fetch_catalog(&self) -> Result<Vec<Listing>, FetchError> {
        let url = self.items_url()?;
        debug!(%url, authenticated = self.is_authenticated(), "fetching catalog");

        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some((id, secret)) = self.credentials.basic_auth() {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let mut body = response.bytes().await?.to_vec();
        let (listings, dropped) = decode_catalog(&mut body)?;
        if dropped > 0 {
            debug!(dropped, "discarded nameless catalog rows");
        }
        Ok(listings)
    }
}
