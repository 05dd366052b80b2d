//! Conversation message types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the visitor or chosen from a welcome button.
    User,
    /// Returned by the webhook, or a fixed fallback text.
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => f.write_str("user"),
            Sender::Bot => f.write_str("bot"),
        }
    }
}

/// A persisted message.
///
/// Serialized as `{message, sender, timestamp}` with an epoch-millisecond
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(rename = "message")]
    pub text: String,
    pub sender: Sender,
    pub timestamp: i64,
}

impl StoredMessage {
    pub fn new(text: impl Into<String>, sender: Sender, timestamp: i64) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_layout() {
        let message = StoredMessage::new("Hi", Sender::Bot, 1_700_000_000_000);
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"message": "Hi", "sender": "bot", "timestamp": 1_700_000_000_000i64})
        );
    }
}
