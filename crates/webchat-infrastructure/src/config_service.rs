//! Configuration service implementation.
//!
//! Loads the widget configuration from a TOML or JSON file (chosen by
//! extension), applies the sanitizing rules and caches the result.

use crate::paths::WebchatPaths;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};
use webchat_core::config::WidgetConfig;
use webchat_core::error::{Result, WidgetError};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension. Anything other than `.json`
    /// is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Configuration service that loads and caches the widget configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit file; `None` means the platform default location.
    path: Option<PathBuf>,
    /// Cached sanitized configuration.
    config: Arc<RwLock<Option<WidgetConfig>>>,
}

impl ConfigService {
    /// Uses the platform default file (`~/.config/webchat/config.toml`).
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses an explicit file. Unlike the default location, a missing
    /// explicit file is an error.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the sanitized configuration, loading it on first access.
    pub fn get_config(&self) -> Result<WidgetConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| WidgetError::internal("Config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load()?.sanitized();

        {
            let mut write_lock = self
                .config
                .write()
                .map_err(|_| WidgetError::internal("Config cache lock poisoned"))?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load(&self) -> Result<WidgetConfig> {
        match &self.path {
            Some(path) => load_config_file(path),
            None => {
                let path = WebchatPaths::config_file()
                    .map_err(|e| WidgetError::config(e.to_string()))?;
                if !path.exists() {
                    info!(path = %path.display(), "No config file, using defaults");
                    return Ok(WidgetConfig::default());
                }
                load_config_file(&path)
            }
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and parses a configuration file without sanitizing it.
///
/// An empty file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<WidgetConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        WidgetError::io(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parses configuration text in the given format.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<WidgetConfig> {
    if content.trim().is_empty() {
        return Ok(WidgetConfig::default());
    }

    let config = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Json => WidgetConfig::from_json(content)?,
    };
    debug!(?format, "Parsed widget config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_config(
            r#"
webhookUrl = "https://hooks.example.com/chat"
agentName = "Max"
conversationTimeoutMinutes = 0

[[actionButtons]]
text = "Book"
action = "book"

[metadata]
tenant = "acme"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.example.com/chat")
        );
        assert_eq!(config.agent_name, "Max");
        assert_eq!(config.conversation_timeout_minutes, 0);
        assert_eq!(config.action_buttons.len(), 1);
        assert_eq!(config.action_buttons[0].action, "book");
        assert_eq!(config.metadata["tenant"], "acme");
        assert_eq!(config.subtitle, WidgetConfig::default().subtitle);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(
            parse_config("  \n", ConfigFormat::Json).unwrap(),
            WidgetConfig::default()
        );
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = parse_config("{", ConfigFormat::Json).unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_service_sanitizes_and_caches() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"webhookUrl": "javascript:alert(1)", "agentName": "<b>Bot</b>"}"#,
        )
        .unwrap();

        let service = ConfigService::with_path(&path);
        let config = service.get_config().unwrap();
        assert_eq!(config.webhook_url, None);
        assert_eq!(config.agent_name, "&lt;b&gt;Bot&lt;/b&gt;");

        std::fs::write(&path, r#"{"agentName": "Changed"}"#).unwrap();
        assert_eq!(service.get_config().unwrap().agent_name, "&lt;b&gt;Bot&lt;/b&gt;");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().agent_name, "Changed");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("absent.toml"));
        assert!(service.get_config().is_err());
    }
}
