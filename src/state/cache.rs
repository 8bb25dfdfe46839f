use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::CatalogSource;
use crate::error::CatalogError;
use crate::state::Listing;

/// Default freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Shared, immutable catalog snapshot. Cheap to clone.
pub type Catalog = Arc<Vec<Listing>>;

#[derive(Debug)]
struct CacheEntry {
    snapshot: Catalog,
    /// None after `invalidate()`: snapshot is kept only as a fallback.
    fetched_at: Option<Instant>,
    fetched_at_utc: DateTime<Utc>,
}

/// Bounded-staleness view of the remote catalog.
///
/// Within the TTL, `get()` returns the same snapshot without touching the
/// network. Past the TTL it refetches; if that fails, the last good
/// snapshot is served instead, no matter how old. Only a cold cache with a
/// failing fetch is an error.
///
/// The lock is held across the fetch, so concurrent callers share one
/// request and never see a half-swapped entry.
pub struct CatalogCache<S> {
    source: S,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<S: CatalogSource> CatalogCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self) -> Result<Catalog, CatalogError> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if let Some(at) = cached.fetched_at {
                if at.elapsed() < self.ttl {
                    debug!(listings = cached.snapshot.len(), "catalog cache hit");
                    return Ok(Arc::clone(&cached.snapshot));
                }
            }
        }

        match self.source.fetch_catalog().await {
            Ok(listings) => {
                info!(listings = listings.len(), "fetched fresh catalog");
                let snapshot = Arc::new(listings);
                *entry = Some(CacheEntry {
                    snapshot: Arc::clone(&snapshot),
                    fetched_at: Some(Instant::now()),
                    fetched_at_utc: Utc::now(),
                });
                Ok(snapshot)
            }
            Err(err) => match entry.as_ref() {
                Some(stale) => {
                    let age = Utc::now() - stale.fetched_at_utc;
                    warn!(
                        error = %err,
                        age_secs = age.num_seconds(),
                        "catalog fetch failed, serving stale snapshot"
                    );
                    Ok(Arc::clone(&stale.snapshot))
                }
                None => Err(CatalogError::Unavailable(err)),
            },
        }
    }

    /// Force the next `get()` to fetch. The snapshot stays as a fallback.
    pub async fn invalidate(&self) {
        if let Some(cached) = self.entry.lock().await.as_mut() {
            cached.fetched_at = None;
        }
    }

    /// Wall-clock time of the last successful fetch.
    pub async fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.entry.lock().await.as_ref().map(|e| e.fetched_at_utc)
    }
}
