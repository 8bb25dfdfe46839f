use rust_decimal::Decimal;

use crate::state::{Listing, StatTrak, TrackedItem, WearFilter, STATTRAK_MARKER};

/// Does this listing satisfy the criteria?
///
/// Pure and total: every field predicate must pass. Garbled input just
/// fails to match.
pub fn matches(listing: &Listing, criteria: &TrackedItem) -> bool {
    name_matches(&listing.name, &criteria.weapon_name, &criteria.skin_name)
        && stattrak_matches(&listing.name, criteria.stattrak)
        && wear_matches(&listing.name, &criteria.wear)
        && price_matches(listing, criteria.min_price, criteria.max_price)
}

/// Lowercase and collapse runs of whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Loose substring match on weapon and skin, in any order.
/// False positives are accepted over false negatives. Empty names never
/// match.
pub fn name_matches(listing_name: &str, weapon: &str, skin: &str) -> bool {
    let weapon = normalize(weapon);
    let skin = normalize(skin);
    if weapon.is_empty() || skin.is_empty() {
        return false;
    }
    let name = normalize(listing_name);
    !name.is_empty() && name.contains(&weapon) && name.contains(&skin)
}

pub fn stattrak_matches(listing_name: &str, requirement: StatTrak) -> bool {
    let is_stattrak = listing_name.contains(STATTRAK_MARKER);
    match requirement {
        StatTrak::Required => is_stattrak,
        StatTrak::Excluded => !is_stattrak,
        StatTrak::Any => true,
    }
}

/// Custom float ranges always pass: catalog names carry no float value.
pub fn wear_matches(listing_name: &str, wear: &WearFilter) -> bool {
    match wear {
        WearFilter::Any => true,
        WearFilter::Preset(Some(preset)) => listing_name.contains(preset.phrase()),
        WearFilter::Preset(None) => true,
        WearFilter::Custom { .. } => true,
    }
}

/// Compare the effective price (in major units) to the bounds.
/// Listings with no price data always pass; zero bounds are unset.
pub fn price_matches(listing: &Listing, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    let Some(price) = listing.effective_price() else {
        return true;
    };
    if let Some(min) = min.filter(|m| !m.is_zero()) {
        if price < min {
            return false;
        }
    }
    if let Some(max) = max.filter(|m| !m.is_zero()) {
        if price > max {
            return false;
        }
    }
    true
}
