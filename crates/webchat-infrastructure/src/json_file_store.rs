//! Persistent-scoped key-value store backed by one JSON file.
//!
//! The whole map is rewritten on every mutation using the tmp file + fsync +
//! rename pattern, so a crash never leaves a half-written file behind.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, warn};
use webchat_core::error::{Result, WidgetError};
use webchat_core::session::KeyValueStore;

type Entries = BTreeMap<String, String>;

/// JSON-file key-value store.
///
/// # Features
///
/// - **Atomic writes**: Uses tmp file + fsync + atomic rename pattern
/// - **Async-safe**: File I/O runs inside `tokio::task::spawn_blocking`
/// - **Serialized mutations**: Writers inside one process are queued on a
///   mutex; separate processes sharing the file are not coordinated
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries> {
        let path = self.path.clone();
        task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .map_err(|e| WidgetError::internal(format!("Store task failed: {}", e)))?
    }

    async fn write_entries(&self, entries: Entries) -> Result<()> {
        let path = self.path.clone();
        task::spawn_blocking(move || Self::save_sync(&path, &entries))
            .await
            .map_err(|e| WidgetError::internal(format!("Store task failed: {}", e)))?
    }

    /// Reads the map. A missing or empty file is an empty map; an unreadable
    /// one is logged and treated as empty so the next write replaces it.
    fn load_sync(path: &Path) -> Result<Entries> {
        if !path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WidgetError::io(format!("Failed to read store '{}': {}", path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable store file");
                Ok(Entries::new())
            }
        }
    }

    fn save_sync(path: &Path, entries: &Entries) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    WidgetError::io(format!(
                        "Failed to create store directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;

        let tmp_path = path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            WidgetError::storage(format!(
                "Failed to create temp file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            WidgetError::storage(format!(
                "Failed to write temp file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        tmp_file.sync_all().map_err(|e| {
            WidgetError::storage(format!(
                "Failed to sync temp file '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        drop(tmp_file);

        fs::rename(&tmp_path, path).map_err(|e| {
            WidgetError::storage(format!(
                "Failed to rename temp file '{}' to '{}': {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), keys = entries.len(), "Store saved");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(entries).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("conversation.json");

        let store = JsonFileStore::new(&path);
        store.set_item("n8n_chat_session_id", "session_1_ab").await.unwrap();
        store.set_item("other", "x").await.unwrap();
        store.remove_item("other").await.unwrap();
        drop(store);

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get_item("n8n_chat_session_id").await.unwrap().as_deref(),
            Some("session_1_ab")
        );
        assert!(reopened.get_item("other").await.unwrap().is_none());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("none.json"));
        assert!(store.get_item("k").await.unwrap().is_none());
        store.remove_item("k").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_replaced() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("conversation.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.get_item("k").await.unwrap().is_none());
        store.set_item("k", "v").await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Entries = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.get("k").map(String::as_str), Some("v"));
    }
}
