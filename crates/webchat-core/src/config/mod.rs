//! Widget configuration.
//!
//! The configuration object is built once at startup and read-only
//! afterwards. Key names follow the page-level `ChatWidgetConfig` object so
//! an existing configuration can be deserialized as-is.

mod site;
mod validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::escape_html;

pub use site::{SiteContext, SiteSettings, render_config_script};
pub use validate::{
    sanitize_hex_color, sanitize_text_field, sanitize_textarea_field, validate_optional_url,
    validate_url,
};

pub const DEFAULT_PRIMARY_COLOR: &str = "#0891b2";
pub const DEFAULT_POWERED_BY_URL: &str = "https://www.explained.consulting";
pub const DEFAULT_CHAT_INPUT_KEY: &str = "chatInput";
pub const DEFAULT_CHAT_SESSION_KEY: &str = "sessionId";
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 20;

/// A welcome-screen button: the label shown to the visitor and the action
/// token sent to the webhook when it starts the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    #[serde(rename = "text")]
    pub label: String,
    pub action: String,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

pub fn default_action_buttons() -> Vec<ActionButton> {
    vec![
        ActionButton::new("Get Started", "get_started"),
        ActionButton::new("I have a question", "question"),
        ActionButton::new("Other", "other"),
    ]
}

/// Which key-value store backs the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    /// Discarded when the browsing session (or host process) ends.
    Session,
    /// Survives restarts.
    Persistent,
}

/// Startup configuration of the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub welcome_message: String,
    pub subtitle: String,
    pub action_buttons: Vec<ActionButton>,
    pub agent_name: String,
    pub agent_avatar: String,
    pub primary_color: String,
    pub show_agent: bool,
    pub company_name: String,
    pub company_tagline: String,
    pub recording_disclaimer: String,
    pub terms_of_use_url: String,
    pub privacy_policy_url: String,
    pub powered_by: String,
    pub powered_by_url: String,
    /// Webhook endpoint. `None` disables network I/O entirely.
    pub webhook_url: Option<String>,
    /// Payload key carrying the message text.
    pub chat_input_key: String,
    /// Payload key carrying the session id.
    pub chat_session_key: String,
    /// Inactivity timeout in minutes; 0 disables expiry.
    pub conversation_timeout_minutes: u64,
    /// Extra fields merged into every webhook payload.
    pub metadata: Map<String, Value>,
    pub use_session_storage: bool,
    /// Unrecognized keys, passed through into outbound metadata.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Hello! Welcome to our chat.".to_string(),
            subtitle: "I am here to help.".to_string(),
            action_buttons: default_action_buttons(),
            agent_name: "Sarah".to_string(),
            agent_avatar: String::new(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            show_agent: true,
            company_name: "The Grout Medic".to_string(),
            company_tagline: "Chatting with Sarah".to_string(),
            recording_disclaimer:
                "This transcript will be recorded by The Grout Medic and its affiliates."
                    .to_string(),
            terms_of_use_url: "#".to_string(),
            privacy_policy_url: "#".to_string(),
            powered_by: "Explained Consulting".to_string(),
            powered_by_url: DEFAULT_POWERED_BY_URL.to_string(),
            webhook_url: None,
            chat_input_key: DEFAULT_CHAT_INPUT_KEY.to_string(),
            chat_session_key: DEFAULT_CHAT_SESSION_KEY.to_string(),
            conversation_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            metadata: Map::new(),
            use_session_storage: false,
            extra: Map::new(),
        }
    }
}

impl WidgetConfig {
    /// Parses a configuration object from JSON text.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns a copy with every free-text field escaped and every URL field
    /// validated against http/https.
    ///
    /// Escaping never touches emoji, so labels such as "📞 Call us" keep
    /// their glyphs.
    pub fn sanitized(&self) -> Self {
        Self {
            welcome_message: escape_html(&self.welcome_message),
            subtitle: escape_html(&self.subtitle),
            action_buttons: self
                .action_buttons
                .iter()
                .map(|button| ActionButton {
                    label: escape_html(&button.label),
                    action: escape_html(&button.action),
                })
                .collect(),
            agent_name: escape_html(&self.agent_name),
            agent_avatar: validate_url(&self.agent_avatar, ""),
            primary_color: sanitize_hex_color(&self.primary_color)
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            show_agent: self.show_agent,
            company_name: escape_html(&self.company_name),
            company_tagline: escape_html(&self.company_tagline),
            recording_disclaimer: escape_html(&self.recording_disclaimer),
            terms_of_use_url: validate_url(&self.terms_of_use_url, "#"),
            privacy_policy_url: validate_url(&self.privacy_policy_url, "#"),
            powered_by: escape_html(&self.powered_by),
            powered_by_url: validate_url(&self.powered_by_url, DEFAULT_POWERED_BY_URL),
            webhook_url: self.webhook_url.as_deref().and_then(validate_optional_url),
            chat_input_key: self.chat_input_key.clone(),
            chat_session_key: self.chat_session_key.clone(),
            conversation_timeout_minutes: self.conversation_timeout_minutes,
            metadata: self.metadata.clone(),
            use_session_storage: self.use_session_storage,
            extra: self.extra.clone(),
        }
    }

    pub fn storage_scope(&self) -> StorageScope {
        if self.use_session_storage {
            StorageScope::Session
        } else {
            StorageScope::Persistent
        }
    }

    /// Metadata sent with every webhook turn.
    ///
    /// Unknown configuration keys come first so an explicit `metadata` entry
    /// with the same name wins.
    pub fn outbound_metadata(&self) -> Map<String, Value> {
        let mut merged = self.extra.clone();
        for (key, value) in &self.metadata {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Looks up the action token of a configured button by its label.
    pub fn action_for_label(&self, label: &str) -> Option<&str> {
        self.action_buttons
            .iter()
            .find(|button| button.label == label)
            .map(|button| button.action.as_str())
    }
}
