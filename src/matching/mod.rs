mod predicates;
mod stats;

pub use predicates::{matches, name_matches, price_matches, stattrak_matches, wear_matches};
pub use stats::MatchSummary;

use std::collections::HashMap;

use crate::api::CatalogSource;
use crate::error::CatalogError;
use crate::state::{CatalogCache, Listing, TrackStatus, TrackedItem};

/// Hard cap on listings returned per tracked item.
pub const MAX_RESULTS: usize = 50;

/// Tracked item id → its ranked matches. Items with no match are absent.
pub type MatchMap = HashMap<String, Vec<Listing>>;

/// Filter one catalog for one criteria record, cheapest first, capped.
///
/// Listings with no price data sort as 0, ahead of everything priced.
pub fn match_catalog(catalog: &[Listing], criteria: &TrackedItem) -> Vec<Listing> {
    let mut found: Vec<Listing> = catalog
        .iter()
        .filter(|listing| matches(listing, criteria))
        .cloned()
        .collect();

    // Stable: equal prices keep catalog order
    found.sort_by_key(Listing::sort_price);
    found.truncate(MAX_RESULTS);
    found
}

/// Matches for one tracked item against the current catalog.
pub async fn find_matches<S: CatalogSource>(
    cache: &CatalogCache<S>,
    criteria: &TrackedItem,
) -> Result<Vec<Listing>, CatalogError> {
    let catalog = cache.get().await?;
    Ok(match_catalog(&catalog, criteria))
}

/// Run every `Tracking` item against one already-fetched catalog.
pub fn check_catalog<'a>(
    catalog: &[Listing],
    items: impl IntoIterator<Item = &'a TrackedItem>,
) -> MatchMap {
    items
        .into_iter()
        .filter(|item| item.status == TrackStatus::Tracking)
        .filter_map(|item| {
            let found = match_catalog(catalog, item);
            (!found.is_empty()).then(|| (item.id.clone(), found))
        })
        .collect()
}

/// Batch check: the catalog is fetched once and shared by every item.
pub async fn check_all<S: CatalogSource>(
    cache: &CatalogCache<S>,
    items: &[TrackedItem],
) -> Result<MatchMap, CatalogError> {
    let catalog = cache.get().await?;
    Ok(check_catalog(&catalog, items))
}

/// Case-insensitive substring search over listing names.
pub fn search(catalog: &[Listing], query: &str) -> Vec<Listing> {
    let query = query.to_lowercase();
    catalog
        .iter()
        .filter(|l| l.name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}
