//! Platform paths for webchat configuration and conversation data.
//!
//! Resolved through `dirs` so hosts land in the conventional location on
//! Linux, macOS and Windows.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// No platform config directory could be determined.
    #[error("Cannot find config directory")]
    ConfigDirNotFound,

    /// No platform data directory could be determined.
    #[error("Cannot find data directory")]
    DataDirNotFound,
}

/// Path layout.
///
/// ```text
/// ~/.config/webchat/            # Config directory
/// └── config.toml               # Widget configuration (config.json also accepted)
///
/// ~/.local/share/webchat/       # Data directory
/// └── conversation.json         # Persistent-scope key-value store
/// ```
pub struct WebchatPaths;

impl WebchatPaths {
    const APP_DIR: &'static str = "webchat";

    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    /// Default configuration file, `config.toml` in the config directory.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// File backing the persistent-scope store inside `dir`.
    pub fn store_file_in(dir: &std::path::Path) -> PathBuf {
        dir.join("conversation.json")
    }

    /// Default file backing the persistent-scope store.
    pub fn store_file() -> Result<PathBuf, PathError> {
        Ok(Self::store_file_in(&Self::data_dir()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_file_in() {
        let path = WebchatPaths::store_file_in(std::path::Path::new("/tmp/x"));
        assert_eq!(path, PathBuf::from("/tmp/x/conversation.json"));
    }

    #[test]
    fn test_config_file_under_app_dir() {
        if let Ok(path) = WebchatPaths::config_file() {
            assert!(path.ends_with("webchat/config.toml"));
        }
    }
}
