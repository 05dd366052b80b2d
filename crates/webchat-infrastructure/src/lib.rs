pub mod config_service;
pub mod json_file_store;
pub mod memory_store;
pub mod paths;

use std::path::Path;
use std::sync::Arc;

use webchat_core::config::StorageScope;
use webchat_core::session::KeyValueStore;

pub use crate::config_service::{ConfigFormat, ConfigService, load_config_file, parse_config};
pub use crate::json_file_store::JsonFileStore;
pub use crate::memory_store::MemoryKeyValueStore;
pub use crate::paths::{PathError, WebchatPaths};

/// Opens the store for a storage scope.
///
/// Session scope is process memory. Persistent scope is a JSON file in
/// `data_dir`, or in the platform data directory when `data_dir` is `None`.
pub fn open_store(
    scope: StorageScope,
    data_dir: Option<&Path>,
) -> Result<Arc<dyn KeyValueStore>, PathError> {
    match scope {
        StorageScope::Session => Ok(Arc::new(MemoryKeyValueStore::new())),
        StorageScope::Persistent => {
            let path = match data_dir {
                Some(dir) => WebchatPaths::store_file_in(dir),
                None => WebchatPaths::store_file()?,
            };
            tracing::debug!(path = %path.display(), "Opening persistent store");
            Ok(Arc::new(JsonFileStore::new(path)))
        }
    }
}
