use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::api::CatalogSource;
use crate::error::ReconcileError;
use crate::matching::{check_catalog, match_catalog, MatchMap};
use crate::state::{CatalogCache, StatusCounts, TrackStatus, TrackedItem};
use crate::store::TrackedStore;

/// What one completed run did.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Current matches for every active item that has any, for display.
    /// Includes `Found` items.
    pub matches: MatchMap,
    /// Ids moved `Tracking → Found` by this run.
    pub newly_found: Vec<String>,
    /// Status totals after the run.
    pub counts: StatusCounts,
    /// Items considered (everything not cancelled).
    pub checked: usize,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Another run was already in flight; this trigger was dropped.
    Coalesced,
}

/// Releases the in-progress flag on drop, success or failure.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives `Tracking → Found` from catalog matches.
///
/// Owns the catalog cache so one snapshot serves every item in a run.
/// Only one run is in flight at a time; overlapping triggers coalesce.
pub struct Reconciler<S, T> {
    cache: CatalogCache<S>,
    store: T,
    running: AtomicBool,
}

impl<S: CatalogSource, T: TrackedStore> Reconciler<S, T> {
    pub fn new(cache: CatalogCache<S>, store: T) -> Self {
        Self {
            cache,
            store,
            running: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &CatalogCache<S> {
        &self.cache
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Explicit refresh: drop freshness first so the run fetches.
    pub async fn refresh(&self) -> Result<RunOutcome, ReconcileError> {
        if self.is_running() {
            warn!("refresh requested while a run is in progress, skipping");
            return Ok(RunOutcome::Coalesced);
        }
        self.cache.invalidate().await;
        self.run().await
    }

    /// One reconciliation pass.
    ///
    /// Any failure aborts before the store is written, so statuses are
    /// either all updated or untouched.
    pub async fn run(&self) -> Result<RunOutcome, ReconcileError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("run already in progress, coalescing trigger");
            return Ok(RunOutcome::Coalesced);
        };

        let mut items = self.store.load_all().await?;
        let active: Vec<&TrackedItem> = items.iter().filter(|i| i.is_active()).collect();
        let checked = active.len();
        if checked == 0 {
            info!("no active tracked items");
            return Ok(RunOutcome::Completed(RunReport {
                counts: StatusCounts::tally(&items),
                ..Default::default()
            }));
        }

        let catalog = self.cache.get().await?;
        let mut matches = check_catalog(&catalog, active.iter().copied());

        // Found items never transition again but still get fresh matches
        for item in active.iter().filter(|i| i.status == TrackStatus::Found) {
            let found = match_catalog(&catalog, item);
            if !found.is_empty() {
                matches.insert(item.id.clone(), found);
            }
        }

        let mut newly_found = Vec::new();
        for item in items.iter_mut().filter(|i| i.is_active()) {
            let count = matches.get(&item.id).map_or(0, Vec::len);
            if item.observe_matches(count) {
                info!(id = %item.id, weapon = %item.weapon_name, skin = %item.skin_name, matches = count, "tracked item found");
                newly_found.push(item.id.clone());
            }
        }

        if !newly_found.is_empty() {
            self.store.save_all(&items).await?;
        }

        let counts = StatusCounts::tally(&items);
        info!(
            checked,
            newly_found = newly_found.len(),
            with_matches = matches.len(),
            "reconciliation run complete"
        );

        Ok(RunOutcome::Completed(RunReport {
            matches,
            newly_found,
            counts,
            checked,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSource;
    use crate::error::{CatalogError, StoreError};
    use crate::state::{Listing, StatTrak};
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn chopper_catalog() -> Vec<Listing> {
        vec![
            Listing::new("StatTrak™ P90 | Chopper (Factory New)").with_prices(Some(500), None),
            Listing::new("P90 | Chopper (Field-Tested)").with_prices(Some(120), None),
        ]
    }

    fn reconciler(
        script: Vec<Option<Vec<Listing>>>,
        items: Vec<TrackedItem>,
    ) -> (Arc<MockSource>, Reconciler<Arc<MockSource>, MemoryStore>) {
        let source = Arc::new(MockSource::new(script));
        let cache = CatalogCache::new(Arc::clone(&source));
        (source, Reconciler::new(cache, MemoryStore::new(items)))
    }

    fn completed(outcome: RunOutcome) -> RunReport {
        match outcome {
            RunOutcome::Completed(report) => report,
            RunOutcome::Coalesced => panic!("run was coalesced"),
        }
    }

    async fn status_of(r: &Reconciler<Arc<MockSource>, MemoryStore>, id: &str) -> TrackStatus {
        r.store().get(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_tracking_becomes_found() {
        let mut no_st = TrackedItem::new("plain", "P90", "Chopper");
        no_st.stattrak = StatTrak::Excluded;
        let missing = TrackedItem::new("howl", "M4A4", "Howl");

        let (source, r) = reconciler(vec![Some(chopper_catalog())], vec![no_st, missing]);
        let report = completed(r.run().await.unwrap());

        assert_eq!(source.calls(), 1);
        assert_eq!(report.newly_found, vec!["plain".to_string()]);
        assert_eq!(report.checked, 2);
        assert_eq!(report.counts.found, 1);
        assert_eq!(report.counts.tracking, 1);
        assert_eq!(r.store().writes(), 1);
        assert_eq!(status_of(&r, "plain").await, TrackStatus::Found);
        assert_eq!(status_of(&r, "howl").await, TrackStatus::Tracking);
    }

    #[tokio::test]
    async fn test_no_transition_no_write() {
        let (_, r) = reconciler(
            vec![Some(chopper_catalog())],
            vec![TrackedItem::new("howl", "M4A4", "Howl")],
        );
        let report = completed(r.run().await.unwrap());

        assert!(report.newly_found.is_empty());
        assert!(report.matches.is_empty());
        assert_eq!(r.store().writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_found_is_sticky() {
        let (_, r) = reconciler(
            vec![Some(chopper_catalog()), Some(Vec::new())],
            vec![TrackedItem::new("p90", "P90", "Chopper")],
        );

        completed(r.run().await.unwrap());
        assert_eq!(status_of(&r, "p90").await, TrackStatus::Found);

        // Catalog empties out; status must not revert
        r.refresh().await.unwrap();
        assert_eq!(status_of(&r, "p90").await, TrackStatus::Found);
        assert_eq!(r.store().writes(), 1);
    }

    #[tokio::test]
    async fn test_found_items_still_get_display_matches() {
        let mut item = TrackedItem::new("p90", "P90", "Chopper");
        item.status = TrackStatus::Found;
        let (_, r) = reconciler(vec![Some(chopper_catalog())], vec![item]);

        let report = completed(r.run().await.unwrap());
        assert_eq!(report.matches["p90"].len(), 2);
        assert!(report.newly_found.is_empty());
        assert_eq!(r.store().writes(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_excluded() {
        let mut item = TrackedItem::new("p90", "P90", "Chopper");
        item.status = TrackStatus::Cancelled;
        let (source, r) = reconciler(vec![Some(chopper_catalog())], vec![item]);

        let report = completed(r.run().await.unwrap());
        assert!(report.matches.is_empty());
        assert_eq!(report.checked, 0);
        assert_eq!(report.counts.cancelled, 1);
        // Nothing active, nothing fetched
        assert_eq!(source.calls(), 0);
        assert_eq!(status_of(&r, "p90").await, TrackStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cold_failure_aborts_without_writes() {
        let (_, r) = reconciler(vec![None], vec![TrackedItem::new("p90", "P90", "Chopper")]);

        let result = r.run().await;
        assert!(matches!(
            result,
            Err(ReconcileError::Catalog(CatalogError::Unavailable(_)))
        ));
        assert_eq!(r.store().writes(), 0);
        assert_eq!(status_of(&r, "p90").await, TrackStatus::Tracking);
        // Guard released after failure
        assert!(!r.is_running());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let (_, r) = reconciler(
            vec![Some(chopper_catalog())],
            vec![TrackedItem::new("p90", "P90", "Chopper")],
        );
        r.store().set_fail_writes(true);

        let result = r.run().await;
        assert!(matches!(result, Err(ReconcileError::Store(StoreError::Io(_)))));
        assert_eq!(status_of(&r, "p90").await, TrackStatus::Tracking);
    }

    #[tokio::test]
    async fn test_overlapping_run_coalesced() {
        let (source, r) = reconciler(
            vec![Some(chopper_catalog())],
            vec![TrackedItem::new("p90", "P90", "Chopper")],
        );

        let held = RunGuard::acquire(&r.running).unwrap();
        assert!(matches!(r.run().await.unwrap(), RunOutcome::Coalesced));
        assert!(matches!(r.refresh().await.unwrap(), RunOutcome::Coalesced));
        assert_eq!(source.calls(), 0);
        drop(held);

        completed(r.run().await.unwrap());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_two_items_one_fetch() {
        let (source, r) = reconciler(
            vec![Some(chopper_catalog())],
            vec![
                TrackedItem::new("a", "P90", "Chopper"),
                TrackedItem::new("b", "p90", "chopper"),
            ],
        );

        let report = completed(r.run().await.unwrap());
        assert_eq!(source.calls(), 1);
        assert!(report.matches.contains_key("a"));
        assert!(report.matches.contains_key("b"));
        assert_eq!(report.newly_found.len(), 2);
        assert_eq!(r.store().writes(), 1);
    }
}
