//! Session domain module.
//!
//! This module contains the conversation identity, the persisted message
//! types, the key-value store interface and the conversation state machine.
//!
//! # Module Structure
//!
//! - `model`: Session identity (`SessionId`)
//! - `message`: Persisted message types (`Sender`, `StoredMessage`)
//! - `store`: Store trait for conversation persistence (`KeyValueStore`)
//! - `manager`: Storage lifecycle and expiry (`ConversationStore`)
//! - `state`: Phase and in-flight tracking (`ConversationState`)

mod manager;
mod message;
mod model;
mod state;
mod store;

// Re-export public API
pub use manager::{ConversationStore, LAST_ACTIVITY_KEY, MESSAGES_KEY, SESSION_ID_KEY};
pub use message::{Sender, StoredMessage};
pub use model::{SESSION_ENTROPY_BYTES, SessionId};
pub use state::{ConversationPhase, ConversationState};
pub use store::KeyValueStore;
