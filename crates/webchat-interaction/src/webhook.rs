//! Webhook transport: one JSON POST per conversation turn.
//!
//! Request body:
//!
//! ```text
//! { "action": ..., <sessionKey>: ..., <messageKey>: ..., ...metadata }
//! ```
//!
//! Metadata is merged last, so a metadata entry named like a reserved key
//! replaces it. Hosts relying on that can override the session or message
//! field; hosts that do not should keep those names out of `metadata`.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use webchat_core::config::{DEFAULT_CHAT_INPUT_KEY, DEFAULT_CHAT_SESSION_KEY, WidgetConfig};
use webchat_core::error::TransportError;
use webchat_core::session::SessionId;
use webchat_core::transport::{BotReply, ChatTransport, REPLY_FALLBACK_MESSAGE};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Reply fields probed in order; the first truthy one wins.
pub const REPLY_KEYS: [&str; 4] = ["output", "response", "message", "text"];

/// `ChatTransport` over HTTP.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: Client,
    webhook_url: Option<String>,
    message_key: String,
    session_key: String,
}

impl WebhookTransport {
    /// Creates a transport with the default payload key names.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.filter(|url| !url.trim().is_empty()),
            message_key: DEFAULT_CHAT_INPUT_KEY.to_string(),
            session_key: DEFAULT_CHAT_SESSION_KEY.to_string(),
        }
    }

    /// Builds a transport from the endpoint and key names of `config`.
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self::new(config.webhook_url.clone())
            .with_keys(&config.chat_input_key, &config.chat_session_key)
    }

    /// Overrides the payload key names.
    pub fn with_keys(mut self, message_key: &str, session_key: &str) -> Self {
        self.message_key = message_key.to_string();
        self.session_key = session_key.to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    /// Builds the request body for one turn.
    pub fn build_payload(
        &self,
        message: &str,
        action: &str,
        session: &SessionId,
        metadata: &Map<String, Value>,
    ) -> Value {
        let mut payload = Map::new();
        payload.insert("action".to_string(), Value::from(action));
        payload.insert(self.session_key.clone(), Value::from(session.as_str()));
        payload.insert(self.message_key.clone(), Value::from(message));
        for (key, value) in metadata {
            payload.insert(key.clone(), value.clone());
        }
        Value::Object(payload)
    }
}

#[async_trait]
impl ChatTransport for WebhookTransport {
    async fn send(
        &self,
        message: &str,
        action: &str,
        session: &SessionId,
        metadata: &Map<String, Value>,
    ) -> Result<BotReply, TransportError> {
        let Some(url) = self.webhook_url.as_deref() else {
            return Err(TransportError::NotConfigured);
        };

        let payload = self.build_payload(message, action, session, metadata);
        debug!(session_id = %session, action, "Sending webhook request");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(session_id = %session, status = status.as_u16(), "Webhook returned error status");
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let raw: Value =
            serde_json::from_str(&body).map_err(|e| TransportError::Parse(e.to_string()))?;

        let text = extract_reply(&raw).unwrap_or_else(|| REPLY_FALLBACK_MESSAGE.to_string());
        Ok(BotReply::new(text, raw))
    }
}

/// Extracts the reply text from a response body.
///
/// Probes `output`, `response`, `message`, `text` and then `data.output`.
/// Empty strings, `0`, `false` and `null` are skipped. Non-string values
/// are converted to text (objects and arrays as compact JSON).
pub fn extract_reply(body: &Value) -> Option<String> {
    REPLY_KEYS
        .iter()
        .find_map(|key| body.get(key).and_then(reply_text))
        .or_else(|| {
            body.get("data")
                .and_then(|data| data.get("output"))
                .and_then(reply_text)
        })
}

fn reply_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
