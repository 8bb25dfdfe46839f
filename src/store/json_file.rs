use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::TrackedStore;
use crate::error::StoreError;
use crate::state::TrackedItem;

/// Tracked items as one JSON array on disk.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash never leaves a half-written collection.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TrackedStore for JsonFileStore {
    /// A missing file is an empty collection.
    async fn load_all(&self) -> Result<Vec<TrackedItem>, StoreError> {
        let _guard = self.lock.lock().await;
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save_all(&self, items: &[TrackedItem]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), items = items.len(), "saved tracked items");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{TrackStatus, WearFilter, WearPreset};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tracked.json"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("tracked.json"));

        let mut item = TrackedItem::new("1", "P90", "Chopper");
        item.wear = WearFilter::Preset(Some(WearPreset::Fn));
        item.max_price = Some(dec!(4.5));
        item.status = TrackStatus::Found;

        store.save_all(&[item.clone()]).await.unwrap();
        let loaded = store.load_all().await.unwrap();

        assert_eq!(loaded, vec![item]);
        assert!(!store.path().with_extension("tmp").exists());

        // Prices are plain JSON numbers on disk
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["maxPrice"], serde_json::json!(4.5));
    }

    #[tokio::test]
    async fn test_reads_hand_written_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracked.json");
        std::fs::write(
            &path,
            r#"[{"skinId": "abc", "weaponName": "AK-47", "skinName": "Redline",
                 "stattrak": "any", "wearType": "any", "minPrice": null, "maxPrice": 20}]"#,
        )
        .unwrap();

        let items = JsonFileStore::new(&path).load_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "abc");
        assert_eq!(items[0].status, TrackStatus::Tracking);
        assert_eq!(items[0].max_price, Some(dec!(20)));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracked.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFileStore::new(&path).load_all().await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }
}
