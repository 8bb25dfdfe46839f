use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::TrackedStore;
use crate::error::StoreError;
use crate::state::TrackedItem;

/// In-process store, nothing survives a restart.
/// Counts writes and can be told to fail them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<TrackedItem>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new(items: Vec<TrackedItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    /// Number of successful `save_all` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrackedStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<TrackedItem>, StoreError> {
        Ok(self.items.lock().await.clone())
    }

    async fn save_all(&self, items: &[TrackedItem]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "writes disabled",
            )));
        }
        *self.items.lock().await = items.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
