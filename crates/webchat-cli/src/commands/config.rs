use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use webchat_core::config::{SiteContext, SiteSettings, WidgetConfig, render_config_script};
use webchat_infrastructure::ConfigService;

pub fn check(path: Option<PathBuf>) -> Result<()> {
    let service = match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = service.get_config().context("Failed to load configuration")?;

    for problem in problems(&config) {
        warn!("{}", problem);
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Things in a sanitized config that will keep the widget from working.
fn problems(config: &WidgetConfig) -> Vec<String> {
    let mut problems = Vec::new();
    if config.webhook_url.is_none() {
        problems.push("webhookUrl is missing or not an http(s) URL".to_string());
    }
    if config.action_buttons.is_empty() {
        problems.push("actionButtons is empty; the welcome screen has no buttons".to_string());
    }
    if config.chat_input_key.is_empty() || config.chat_session_key.is_empty() {
        problems.push("chatInputKey and chatSessionKey must not be empty".to_string());
    }
    problems
}

pub fn inject(settings: &Path, site_url: String, page: String, user_agent: String) -> Result<()> {
    let raw = std::fs::read_to_string(settings)
        .with_context(|| format!("Failed to read site settings from {}", settings.display()))?;
    let context = SiteContext {
        site_url,
        page,
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        user_agent,
    };

    match build_injection(&raw, &context)? {
        Some(script) => print!("{}", script),
        None => info!("No valid webhook URL in site settings, nothing to inject"),
    }
    Ok(())
}

/// Turns raw site settings JSON into the injection script, or `None` when
/// the settings have no usable webhook URL.
pub fn build_injection(settings_json: &str, context: &SiteContext) -> Result<Option<String>> {
    let settings: SiteSettings =
        serde_json::from_str(settings_json).context("Site settings are not valid JSON")?;
    let Some(config) = settings.sanitize().to_widget_config(context) else {
        return Ok(None);
    };
    Ok(Some(render_config_script(&config)?))
}
