//! Key-value store trait.
//!
//! Defines the interface of the string store the conversation is persisted
//! in. The engine does not care whether it is session-scoped or persistent.

use async_trait::async_trait;

use crate::error::Result;

/// An abstract string key-value store.
///
/// # Implementation Notes
///
/// No cross-writer locking is expected: two hosts sharing one store may
/// interleave writes, and the last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: Value found
    /// - `Ok(None)`: Key not present
    /// - `Err(_)`: Error occurred during retrieval
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}
