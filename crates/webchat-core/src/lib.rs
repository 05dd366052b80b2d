//! Domain layer of the chat widget.
//!
//! Holds everything that has no I/O of its own: configuration, the text
//! rendering pipeline, conversation persistence rules, the phase state
//! machine and the capability traits hosts implement.

pub mod capability;
pub mod config;
pub mod error;
pub mod listener;
pub mod render;
pub mod session;
pub mod transport;
pub mod view;

// Re-export common error types
pub use error::{Result, TransportError, WidgetError};
