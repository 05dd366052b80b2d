//! The constrained Markdown subset understood by the widget.
//!
//! Rules run over text that has already been HTML-escaped, in the order they
//! appear in [`RULES`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Inline style given to list blocks. Only these properties pass the
/// allow-list sanitizer.
pub const LIST_BLOCK_STYLE: &str = "margin-left: 20px; margin-bottom: 4px;";

/// One rewrite step of the Markdown pipeline.
pub struct MarkdownRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: String,
}

impl MarkdownRule {
    fn new(name: &'static str, pattern: &str, replacement: impl Into<String>) -> Self {
        Self {
            name,
            // Patterns are compile-time constants covered by the tests below.
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid {name} rule: {e}")),
            replacement: replacement.into(),
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// Ordered rule list.
///
/// Bold must run before italic: `**x**` would otherwise be read as two
/// empty italic spans. Newlines become `<br>` while keeping the line break
/// itself, so the list rules can still anchor on line starts; a list line
/// absorbs its trailing `<br>` because the block already breaks the line.
pub static RULES: Lazy<Vec<MarkdownRule>> = Lazy::new(|| {
    vec![
        MarkdownRule::new("bold", r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
        MarkdownRule::new("bold_underscore", r"__(.*?)__", "<strong>${1}</strong>"),
        MarkdownRule::new("italic", r"\*(.*?)\*", "<em>${1}</em>"),
        MarkdownRule::new("italic_underscore", r"_(.*?)_", "<em>${1}</em>"),
        MarkdownRule::new("line_break", r"\r?\n", "<br>\n"),
        MarkdownRule::new(
            "ordered_list",
            r"(?m)^(\d+)\.[ \t]+(.+?)(?:<br>)?$",
            format!(r#"<div style="{LIST_BLOCK_STYLE}"><strong>${{1}}.</strong> ${{2}}</div>"#),
        ),
        MarkdownRule::new(
            "unordered_list",
            r"(?m)^[-*][ \t]+(.+?)(?:<br>)?$",
            format!(r#"<div style="{LIST_BLOCK_STYLE}">• ${{1}}</div>"#),
        ),
    ]
});

/// Applies every rule in order to already-escaped text.
pub fn apply_rules(escaped: &str) -> String {
    RULES
        .iter()
        .fold(escaped.to_string(), |text, rule| rule.apply(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_index(name: &str) -> usize {
        RULES
            .iter()
            .position(|rule| rule.name == name)
            .unwrap_or_else(|| panic!("missing rule {name}"))
    }

    #[test]
    fn test_bold_rules_precede_italic_rules() {
        assert!(rule_index("bold") < rule_index("italic"));
        assert!(rule_index("bold_underscore") < rule_index("italic_underscore"));
    }

    #[test]
    fn test_double_asterisk_is_bold_not_nested_italic() {
        assert_eq!(apply_rules("**hi**"), "<strong>hi</strong>");
        assert_eq!(apply_rules("__hi__"), "<strong>hi</strong>");
    }

    #[test]
    fn test_italic() {
        assert_eq!(apply_rules("an *odd* _one_"), "an <em>odd</em> <em>one</em>");
    }

    #[test]
    fn test_newlines_become_breaks() {
        assert_eq!(apply_rules("a\nb"), "a<br>\nb");
    }

    #[test]
    fn test_ordered_list_lines() {
        let html = apply_rules("Steps:\n1. Mix\n2. Apply");
        assert_eq!(
            html,
            format!(
                "Steps:<br>\n<div style=\"{s}\"><strong>1.</strong> Mix</div>\n<div style=\"{s}\"><strong>2.</strong> Apply</div>",
                s = LIST_BLOCK_STYLE
            )
        );
    }

    #[test]
    fn test_unordered_list_lines() {
        let html = apply_rules("- grout\n- sealant");
        assert_eq!(
            html,
            format!(
                "<div style=\"{s}\">• grout</div>\n<div style=\"{s}\">• sealant</div>",
                s = LIST_BLOCK_STYLE
            )
        );
    }

    #[test]
    fn test_number_without_space_is_not_a_list() {
        assert_eq!(apply_rules("3.5 inches"), "3.5 inches");
    }
}
