//! CMS site settings and page injection.
//!
//! The administration screen stores a flat, snake_case option set. Before a
//! page is served those options are sanitized, turned into a
//! [`WidgetConfig`], and embedded into the page as a `<script>` block.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

use super::validate::{
    sanitize_hex_color, sanitize_text_field, sanitize_textarea_field, validate_optional_url,
};
use super::{
    ActionButton, DEFAULT_CHAT_INPUT_KEY, DEFAULT_CHAT_SESSION_KEY, DEFAULT_PRIMARY_COLOR,
    WidgetConfig, default_action_buttons,
};
use crate::error::Result;

/// Timeout applied when the settings do not carry one.
pub const DEFAULT_SITE_TIMEOUT_MINUTES: u64 = 5;

/// Options saved by the CMS settings form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub webhook_url: Option<String>,
    pub primary_color: Option<String>,
    pub welcome_message: Option<String>,
    pub subtitle: Option<String>,
    pub agent_name: Option<String>,
    pub agent_avatar: Option<String>,
    /// Stored either as an array or as the JSON text typed into the form.
    #[serde(deserialize_with = "deserialize_buttons")]
    pub action_buttons: Option<Vec<ActionButton>>,
    pub company_name: Option<String>,
    pub company_tagline: Option<String>,
    pub show_agent: Option<bool>,
    pub conversation_timeout: Option<i64>,
}

/// Per-request facts about the page the widget is injected into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContext {
    pub site_url: String,
    pub page: String,
    pub timestamp: String,
    pub user_agent: String,
}

fn deserialize_buttons<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<ActionButton>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let value = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(None),
        },
        Some(other) => other,
    };
    Ok(serde_json::from_value(value).ok())
}

impl SiteSettings {
    /// Applies the settings-form sanitization rules.
    pub fn sanitize(&self) -> Self {
        Self {
            webhook_url: self.webhook_url.as_deref().and_then(validate_optional_url),
            primary_color: self.primary_color.as_deref().and_then(sanitize_hex_color),
            welcome_message: Some(
                self.welcome_message
                    .as_deref()
                    .map(sanitize_textarea_field)
                    .unwrap_or_default(),
            ),
            subtitle: Some(self.subtitle.as_deref().map(sanitize_text_field).unwrap_or_default()),
            agent_name: Some(self.agent_name.as_deref().map(sanitize_text_field).unwrap_or_default()),
            agent_avatar: Some(
                self.agent_avatar
                    .as_deref()
                    .and_then(validate_optional_url)
                    .unwrap_or_default(),
            ),
            action_buttons: self.action_buttons.as_ref().map(|buttons| {
                buttons
                    .iter()
                    .map(|button| ActionButton {
                        label: sanitize_text_field(&button.label),
                        action: sanitize_text_field(&button.action),
                    })
                    .collect()
            }),
            company_name: Some(
                self.company_name
                    .as_deref()
                    .map(sanitize_text_field)
                    .unwrap_or_else(|| "The Grout Medic".to_string()),
            ),
            company_tagline: Some(
                self.company_tagline
                    .as_deref()
                    .map(sanitize_text_field)
                    .unwrap_or_else(|| "Chatting with Sarah".to_string()),
            ),
            show_agent: Some(self.show_agent.unwrap_or(true)),
            conversation_timeout: Some(
                self.conversation_timeout
                    .map(i64::saturating_abs)
                    .unwrap_or(DEFAULT_SITE_TIMEOUT_MINUTES as i64),
            ),
        }
    }

    /// Builds the page configuration, or `None` when no webhook is set.
    pub fn to_widget_config(&self, context: &SiteContext) -> Option<WidgetConfig> {
        let webhook_url = self
            .webhook_url
            .as_deref()
            .and_then(validate_optional_url)?;

        let defaults = WidgetConfig::default();
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("wordpress"));
        metadata.insert("site_url".to_string(), json!(context.site_url));
        metadata.insert("page".to_string(), json!(context.page));
        metadata.insert("timestamp".to_string(), json!(context.timestamp));
        metadata.insert("user_agent".to_string(), json!(context.user_agent));

        Some(WidgetConfig {
            webhook_url: Some(webhook_url),
            primary_color: self
                .primary_color
                .clone()
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            welcome_message: self.welcome_message.clone().unwrap_or(defaults.welcome_message),
            subtitle: self.subtitle.clone().unwrap_or(defaults.subtitle),
            agent_name: self.agent_name.clone().unwrap_or(defaults.agent_name),
            agent_avatar: self
                .agent_avatar
                .as_deref()
                .and_then(validate_optional_url)
                .unwrap_or_default(),
            show_agent: self.show_agent.unwrap_or(true),
            company_name: self.company_name.clone().unwrap_or(defaults.company_name),
            company_tagline: self.company_tagline.clone().unwrap_or(defaults.company_tagline),
            action_buttons: self
                .action_buttons
                .clone()
                .unwrap_or_else(default_action_buttons),
            metadata,
            conversation_timeout_minutes: self
                .conversation_timeout
                .map(|minutes| minutes.unsigned_abs())
                .unwrap_or(DEFAULT_SITE_TIMEOUT_MINUTES),
            chat_input_key: DEFAULT_CHAT_INPUT_KEY.to_string(),
            chat_session_key: DEFAULT_CHAT_SESSION_KEY.to_string(),
            ..defaults
        })
    }
}

/// Renders the `<script>` block that publishes the configuration to the page.
///
/// `</` is escaped inside the JSON so a value cannot close the script element.
pub fn render_config_script(config: &WidgetConfig) -> Result<String> {
    let json = serde_json::to_string(config)?.replace("</", "<\\/");
    Ok(format!(
        "<script type=\"text/javascript\">\nwindow.ChatWidgetConfig = {json};\n</script>\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context() -> SiteContext {
        SiteContext {
            site_url: "https://groutmedic.example".to_string(),
            page: "Home - https://groutmedic.example/".to_string(),
            timestamp: "2026-10-19 09:30:00".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }

    #[test]
    fn test_buttons_accept_json_text() {
        let settings: SiteSettings = serde_json::from_value(json!({
            "webhook_url": "https://n8n.example/webhook",
            "action_buttons": "[{\"text\": \"Book\", \"action\": \"book\"}]"
        }))
        .unwrap();
        assert_eq!(settings.action_buttons, Some(vec![ActionButton::new("Book", "book")]));
    }

    #[test]
    fn test_sanitize_applies_form_rules() {
        let settings = SiteSettings {
            webhook_url: Some("javascript:alert(1)".to_string()),
            primary_color: Some("blue".to_string()),
            agent_name: Some("<b>Sam</b>".to_string()),
            conversation_timeout: Some(-7),
            ..SiteSettings::default()
        }
        .sanitize();

        assert_eq!(settings.webhook_url, None);
        assert_eq!(settings.primary_color, None);
        assert_eq!(settings.agent_name.as_deref(), Some("Sam"));
        assert_eq!(settings.company_name.as_deref(), Some("The Grout Medic"));
        assert_eq!(settings.show_agent, Some(true));
        assert_eq!(settings.conversation_timeout, Some(7));
    }

    #[test]
    fn test_no_config_without_webhook() {
        assert!(SiteSettings::default().to_widget_config(&context()).is_none());
    }

    #[test]
    fn test_config_carries_host_metadata_and_defaults() {
        let settings = SiteSettings {
            webhook_url: Some("https://n8n.example/webhook/chat".to_string()),
            ..SiteSettings::default()
        };
        let config = settings.to_widget_config(&context()).unwrap();

        assert_eq!(config.conversation_timeout_minutes, 5);
        assert_eq!(config.primary_color, "#0891b2");
        assert_eq!(config.action_buttons, default_action_buttons());
        assert_eq!(config.metadata.get("source"), Some(&json!("wordpress")));
        assert_eq!(config.metadata.get("user_agent"), Some(&json!("Mozilla/5.0")));
    }

    #[test]
    fn test_script_cannot_be_closed_by_values() {
        let config = WidgetConfig {
            welcome_message: "</script><script>alert(1)</script>".to_string(),
            ..WidgetConfig::default()
        };
        let script = render_config_script(&config).unwrap();
        assert!(script.starts_with("<script type=\"text/javascript\">\nwindow.ChatWidgetConfig = {"));
        assert_eq!(script.matches("</script>").count(), 1);
    }
}
