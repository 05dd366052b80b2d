//! Error types for the webchat engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the webchat crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WidgetError {
    /// Key-value store failure (read, write or remove)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Webhook exchange failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WidgetError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Failure modes of one webhook round trip.
///
/// The variant detail is meant for diagnostics and the `on_error` listener
/// only. End users always see a fixed fallback sentence instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    /// No webhook URL configured; no request was attempted.
    #[error("Chat webhook URL is not configured")]
    NotConfigured,

    /// The request could not be sent or did not complete.
    #[error("Network error: {0}")]
    Network(String),

    /// The webhook answered with a non-2xx status.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// The response body was not valid JSON.
    #[error("Invalid response body: {0}")]
    Parse(String),
}

impl TransportError {
    /// Whether this failure is a configuration problem rather than a network one.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WidgetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WidgetError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, WidgetError>`.
pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_converts_into_widget_error() {
        let err: WidgetError = TransportError::HttpStatus(502).into();
        assert!(matches!(err, WidgetError::Transport(TransportError::HttpStatus(502))));
        assert_eq!(err.to_string(), "Transport error: HTTP error! status: 502");
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: WidgetError = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_helper_constructors_match_predicates() {
        assert!(WidgetError::config("no config dir").is_config());
        assert!(WidgetError::storage("quota").is_storage());
        assert!(!WidgetError::io("disk").is_config());
    }
}
