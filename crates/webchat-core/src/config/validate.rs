//! Field-level validation helpers for configuration values.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").unwrap_or_else(|e| panic!("invalid hex color pattern: {e}"))
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").unwrap_or_else(|e| panic!("invalid tag pattern: {e}")));

/// Returns `url` when it parses as an absolute http(s) URL, otherwise `fallback`.
pub fn validate_url(url: &str, fallback: &str) -> String {
    validate_optional_url(url).unwrap_or_else(|| fallback.to_string())
}

/// Returns the URL only when it parses as an absolute http(s) URL.
pub fn validate_optional_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(url.to_string()),
        _ => None,
    }
}

/// Accepts `#rgb` and `#rrggbb` colors.
pub fn sanitize_hex_color(color: &str) -> Option<String> {
    let color = color.trim();
    HEX_COLOR.is_match(color).then(|| color.to_string())
}

/// Strips tags and collapses whitespace for single-line settings fields.
pub fn sanitize_text_field(text: &str) -> String {
    let stripped = TAG.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips tags for multi-line settings fields, keeping line breaks.
pub fn sanitize_textarea_field(text: &str) -> String {
    let stripped = TAG.replace_all(text, "");
    stripped
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert_eq!(validate_url("https://example.com/a", "#"), "https://example.com/a");
        assert_eq!(validate_url("http://localhost:5678/webhook", "#"), "http://localhost:5678/webhook");
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert_eq!(validate_url("javascript:alert(1)", "#"), "#");
        assert_eq!(validate_url("data:text/html,hi", ""), "");
        assert_eq!(validate_url("not a url", "#"), "#");
        assert_eq!(validate_url("", "fallback"), "fallback");
        assert_eq!(validate_optional_url("ftp://example.com"), None);
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(sanitize_hex_color("#0891b2"), Some("#0891b2".to_string()));
        assert_eq!(sanitize_hex_color("#FFF"), Some("#FFF".to_string()));
        assert_eq!(sanitize_hex_color("red"), None);
        assert_eq!(sanitize_hex_color("#12345"), None);
        assert_eq!(sanitize_hex_color("#0891b2;background:url(x)"), None);
    }

    #[test]
    fn test_text_fields_lose_tags() {
        assert_eq!(sanitize_text_field("  Hi <b>there</b>\n friend "), "Hi there friend");
        assert_eq!(
            sanitize_textarea_field("Line <i>one</i>\n  line   two  "),
            "Line one\nline two"
        );
    }
}
