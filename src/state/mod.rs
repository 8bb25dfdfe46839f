mod cache;
mod criteria;
mod listing;

pub use cache::{Catalog, CatalogCache, DEFAULT_TTL};
pub use criteria::{StatTrak, StatusCounts, TrackStatus, TrackedItem, WearFilter, WearPreset};
pub use listing::{cents_to_major, format_price, Listing, STATTRAK_MARKER};
