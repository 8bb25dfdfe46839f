mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::state::{TrackStatus, TrackedItem};

/// Whole-collection persistence for tracked items.
///
/// Only `load_all` and `save_all` touch storage. Everything else is a
/// read-modify-write over the full collection.
#[async_trait]
pub trait TrackedStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<TrackedItem>, StoreError>;

    async fn save_all(&self, items: &[TrackedItem]) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<TrackedItem>, StoreError> {
        Ok(self.load_all().await?.into_iter().find(|i| i.id == id))
    }

    /// Insert, or replace the record with the same id.
    async fn put(&self, item: TrackedItem) -> Result<(), StoreError> {
        let mut items = self.load_all().await?;
        match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        self.save_all(&items).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut items = self.load_all().await?;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save_all(&items).await
    }

    /// Explicit user status change; the only way to reach `Cancelled`.
    async fn set_status(&self, id: &str, status: TrackStatus) -> Result<(), StoreError> {
        let mut items = self.load_all().await?;
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        item.status = status;
        self.save_all(&items).await
    }
}
