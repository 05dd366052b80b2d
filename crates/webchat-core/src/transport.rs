//! Conversation transport trait.
//!
//! The conversation flow only knows this interface; the HTTP webhook client
//! lives in the interaction layer.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::TransportError;
use crate::session::SessionId;

/// Action token sent with typed input.
pub const DEFAULT_ACTION: &str = "sendMessage";

/// Shown when no webhook URL is configured.
pub const CONFIG_ERROR_MESSAGE: &str =
    "Chat webhook URL is not configured. Please set webhookUrl in ChatWidgetConfig.";

/// Shown for any network or HTTP failure.
pub const CONNECTION_FALLBACK_MESSAGE: &str =
    "Sorry, I'm having trouble connecting. Please try again later.";

/// Shown when the backend answered without any usable reply field.
pub const REPLY_FALLBACK_MESSAGE: &str = "Sorry, I did not understand that.";

/// Confirmation prompt before clearing the conversation.
pub const CLEAR_CONFIRMATION_MESSAGE: &str = "Clear conversation history? This cannot be undone.";

/// A reply from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    /// Extracted reply text, or the fixed fallback.
    pub text: String,
    /// The parsed response body, as handed to `on_message_receive`.
    pub raw: Value,
}

impl BotReply {
    pub fn new(text: impl Into<String>, raw: Value) -> Self {
        Self {
            text: text.into(),
            raw,
        }
    }
}

/// Performs one request/response exchange with the conversation backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one turn.
    ///
    /// # Arguments
    ///
    /// * `message` - The visitor's text (or the button label)
    /// * `action` - Action token identifying what started the turn
    /// * `session` - Session id correlating the conversation
    /// * `metadata` - Extra payload entries merged last into the request body
    ///
    /// # Errors
    ///
    /// `TransportError::NotConfigured` without any I/O when no endpoint is
    /// set; otherwise a network, status or parse failure.
    async fn send(
        &self,
        message: &str,
        action: &str,
        session: &SessionId,
        metadata: &Map<String, Value>,
    ) -> Result<BotReply, TransportError>;
}
