//! Text rendering pipeline for message bodies.
//!
//! Untrusted text (typed by the user or returned by the webhook) goes through
//! three stages:
//!
//! 1. `escape`: full HTML escaping, so no raw tag can survive.
//! 2. `markdown`: a small ordered set of rewrite rules (bold, italic, line
//!    breaks, ordered and unordered list lines).
//! 3. `sanitize`: an independent allow-list pass over the parsed markup tree.
//!
//! Stage 3 does not depend on stages 1 and 2 being correct.

mod escape;
mod markdown;
mod sanitize;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use escape::escape_html;
pub use markdown::{LIST_BLOCK_STYLE, MarkdownRule, RULES, apply_rules};
pub use sanitize::{ALLOWED_ATTRIBUTES, ALLOWED_STYLE_PROPERTIES, ALLOWED_TAGS, sanitize_markup};

/// Markup that has passed the allow-list sanitizer and may be inserted into
/// the view as markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    /// Sanitizes arbitrary markup into a `SafeMarkup`.
    pub fn sanitize(html: &str) -> Self {
        Self(sanitize_markup(html))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeMarkup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Renders raw message text into safe markup.
///
/// # Examples
///
/// ```
/// use webchat_core::render::render;
///
/// let markup = render("**Hi** <b>there</b>");
/// assert_eq!(markup.as_str(), "<strong>Hi</strong> &lt;b&gt;there&lt;/b&gt;");
/// ```
pub fn render(raw: &str) -> SafeMarkup {
    let escaped = escape_html(raw);
    let html = apply_rules(&escaped);
    SafeMarkup::sanitize(&html)
}
