//! HTML escaping primitives.

/// Escapes every HTML-significant character so the result can only ever be
/// interpreted as text.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes a text node for serialization between tags.
///
/// U+FEFF is written as a character reference: the HTML tokenizer drops a
/// raw one at the start of its input, so a literal BOM would not survive a
/// second parse.
pub(crate) fn escape_text_node(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{feff}' => out.push_str("&#xFEFF;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes a value for a double-quoted attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_neutralises_tags() {
        assert_eq!(
            escape_html(r#"<img src=x onerror="alert('1')">"#),
            "&lt;img src=x onerror=&quot;alert(&#39;1&#39;)&quot;&gt;"
        );
    }

    #[test]
    fn test_escape_html_keeps_emoji() {
        assert_eq!(escape_html("Book now 🚀 & save"), "Book now 🚀 &amp; save");
    }
}
