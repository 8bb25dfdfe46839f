use reqwest::Url;
use rust_decimal::Decimal;

use super::criteria::WearPreset;

/// Marker the catalog puts in front of StatTrak item names.
pub const STATTRAK_MARKER: &str = "StatTrak";

const ITEM_PAGE_BASE: &str = "https://skinport.com/item/";

/// One catalog entry. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// e.g. "StatTrak™ P90 | Chopper (Factory New)"
    pub name: String,
    pub min_price: Option<i64>,
    pub suggested_price: Option<i64>,
    pub tradable: Option<bool>,
    pub page_url: Option<String>,
}

impl Listing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_price: None,
            suggested_price: None,
            tradable: None,
            page_url: None,
        }
    }

    pub fn with_prices(mut self, min_price: Option<i64>, suggested_price: Option<i64>) -> Self {
        self.min_price = min_price;
        self.suggested_price = suggested_price;
        self
    }

    /// Current price if listed, else the suggested price.
    /// Zero counts as missing.
    pub fn effective_price_cents(&self) -> Option<i64> {
        self.min_price
            .filter(|p| *p > 0)
            .or(self.suggested_price.filter(|p| *p > 0))
    }

    /// Effective price in major units (dollars).
    pub fn effective_price(&self) -> Option<Decimal> {
        self.effective_price_cents().map(cents_to_major)
    }

    /// Sort key: no price data ranks as 0, i.e. cheapest.
    pub fn sort_price(&self) -> i64 {
        self.effective_price_cents().unwrap_or(0)
    }

    pub fn is_stattrak(&self) -> bool {
        self.name.contains(STATTRAK_MARKER)
    }

    /// First wear phrase found in the name.
    pub fn wear(&self) -> Option<WearPreset> {
        WearPreset::ALL
            .into_iter()
            .find(|w| self.name.contains(w.phrase()))
    }

    /// Percent below suggested price, rounded. 0 when unknown.
    pub fn discount_percent(&self) -> i64 {
        let current = self.effective_price_cents().unwrap_or(0);
        let suggested = self.suggested_price.unwrap_or(0);
        if current == 0 || suggested == 0 {
            return 0;
        }
        let pct = (suggested - current) as f64 / suggested as f64 * 100.0;
        pct.round() as i64
    }

    /// Listing page, falling back to the item page built from the name.
    pub fn url(&self) -> String {
        if let Some(url) = &self.page_url {
            return url.clone();
        }
        match Url::parse(ITEM_PAGE_BASE) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(&self.name);
                }
                url.to_string()
            }
            Err(_) => format!("{}{}", ITEM_PAGE_BASE, self.name),
        }
    }
}

/// Catalog cents → display-currency units.
pub fn cents_to_major(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// "$5.00", or "N/A" when there is no price.
pub fn format_price(cents: Option<i64>) -> String {
    match cents {
        Some(c) if c != 0 => format!("${:.2}", cents_to_major(c)),
        _ => "N/A".to_string(),
    }
}
