//! Persistence of one conversation: session id, messages and last activity.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::message::{Sender, StoredMessage};
use super::model::{SESSION_ENTROPY_BYTES, SessionId};
use super::store::KeyValueStore;
use crate::capability::{Clock, RandomSource};
use crate::error::Result;

/// Storage key of the session id.
pub const SESSION_ID_KEY: &str = "n8n_chat_session_id";
/// Storage key of the JSON message array.
pub const MESSAGES_KEY: &str = "n8n_chat_messages";
/// Storage key of the last-activity epoch-ms marker.
pub const LAST_ACTIVITY_KEY: &str = "n8n_chat_last_activity";

const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Owns the persisted conversation group: session id, message sequence and
/// last-activity marker.
///
/// `ConversationStore` is responsible for:
/// - Lazily creating the session id
/// - Appending messages (whole-sequence read-modify-write)
/// - Tracking activity and discarding the group after the inactivity timeout
#[derive(Clone)]
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    timeout_minutes: u64,
}

impl ConversationStore {
    /// Creates a new `ConversationStore`.
    ///
    /// # Arguments
    ///
    /// * `store` - The key-value store backing the conversation
    /// * `clock` - Time source for timestamps and expiry
    /// * `random` - Entropy source for session ids
    /// * `timeout_minutes` - Inactivity timeout; 0 disables expiry
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
        timeout_minutes: u64,
    ) -> Self {
        Self {
            store,
            clock,
            random,
            timeout_minutes,
        }
    }

    pub fn timeout_minutes(&self) -> u64 {
        self.timeout_minutes
    }

    /// Returns the persisted session id, creating one when absent.
    ///
    /// An expired conversation is discarded first, so the id returned always
    /// belongs to a live conversation group.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub async fn get_or_create_session_id(&self) -> Result<SessionId> {
        self.expire_if_needed().await?;

        if let Some(id) = self.store.get_item(SESSION_ID_KEY).await? {
            if !id.is_empty() {
                return Ok(SessionId::new(id));
            }
        }

        self.issue_session_id().await
    }

    /// Generates, persists and returns a new session id.
    pub async fn issue_session_id(&self) -> Result<SessionId> {
        let mut bytes = [0u8; SESSION_ENTROPY_BYTES];
        self.random.fill_bytes(&mut bytes)?;
        let id = SessionId::generate(self.clock.now_millis(), &bytes);
        self.store.set_item(SESSION_ID_KEY, id.as_str()).await?;
        debug!(session_id = %id, "Issued session id");
        Ok(id)
    }

    /// Appends a message and refreshes the last-activity marker.
    ///
    /// The timestamp defaults to now and is never allowed to go below the
    /// previous message's, keeping the sequence chronological even if the
    /// clock steps back.
    pub async fn record_message(
        &self,
        text: &str,
        sender: Sender,
        timestamp: Option<i64>,
    ) -> Result<StoredMessage> {
        let now = self.clock.now_millis();
        let mut messages = self.load_messages().await?;
        let floor = messages.last().map(|m| m.timestamp).unwrap_or(i64::MIN);
        let message = StoredMessage::new(text, sender, timestamp.unwrap_or(now).max(floor));

        messages.push(message.clone());
        let json = serde_json::to_string(&messages)?;
        self.store.set_item(MESSAGES_KEY, &json).await?;
        self.store
            .set_item(LAST_ACTIVITY_KEY, &now.to_string())
            .await?;

        Ok(message)
    }

    /// Loads the persisted messages in send order.
    ///
    /// A missing entry yields an empty sequence. An unreadable entry is
    /// logged and also treated as empty so a corrupted store cannot lock the
    /// visitor out of the widget.
    pub async fn load_messages(&self) -> Result<Vec<StoredMessage>> {
        let Some(raw) = self.store.get_item(MESSAGES_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable stored messages");
                Ok(Vec::new())
            }
        }
    }

    /// Erases the messages and the activity marker. The session id is left
    /// alone.
    pub async fn clear_conversation(&self) -> Result<()> {
        self.store.remove_item(MESSAGES_KEY).await?;
        self.store.remove_item(LAST_ACTIVITY_KEY).await?;
        Ok(())
    }

    /// Returns the last-activity marker, if any.
    pub async fn last_activity(&self) -> Result<Option<i64>> {
        let raw = self.store.get_item(LAST_ACTIVITY_KEY).await?;
        Ok(raw.and_then(|value| value.trim().parse::<i64>().ok()))
    }

    /// Whether the conversation has been inactive for longer than the
    /// timeout. Always `false` with the timeout disabled or no activity.
    pub async fn is_expired(&self) -> Result<bool> {
        if self.timeout_minutes == 0 {
            return Ok(false);
        }
        let Some(last_activity) = self.last_activity().await? else {
            return Ok(false);
        };

        let timeout_millis = i64::try_from(self.timeout_minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(MILLIS_PER_MINUTE);
        let idle = self.clock.now_millis().saturating_sub(last_activity);
        Ok(idle > timeout_millis)
    }

    /// Discards an expired conversation and issues a new session id.
    ///
    /// # Returns
    ///
    /// `true` if the conversation had expired and was discarded.
    pub async fn expire_if_needed(&self) -> Result<bool> {
        if !self.is_expired().await? {
            return Ok(false);
        }

        self.clear_conversation().await?;
        let id = self.issue_session_id().await?;
        info!(session_id = %id, "Conversation expired - new session id generated");
        Ok(true)
    }

    /// Discards the conversation on request and starts a new session.
    pub async fn reset(&self) -> Result<SessionId> {
        self.clear_conversation().await?;
        let id = self.issue_session_id().await?;
        info!(session_id = %id, "Conversation manually cleared - new session id generated");
        Ok(id)
    }
}
