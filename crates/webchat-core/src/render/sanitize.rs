//! Allow-list sanitizer for rendered markup.
//!
//! This pass parses its input as an HTML fragment and rebuilds it from the
//! tree. It does not trust its input: anything it emits is either an
//! allow-listed element, an allow-listed attribute, or escaped text.

use scraper::{ElementRef, Html, Node};

use super::escape::{escape_attribute, escape_text_node};

/// Elements that survive sanitization.
pub const ALLOWED_TAGS: &[&str] = &["strong", "em", "br", "div"];

/// Attributes that survive sanitization.
pub const ALLOWED_ATTRIBUTES: &[&str] = &["style"];

/// CSS properties kept inside a `style` attribute.
pub const ALLOWED_STYLE_PROPERTIES: &[&str] = &["margin-left", "margin-bottom"];

/// Attributes with this prefix are event handlers and are always dropped.
const EVENT_HANDLER_PREFIX: &str = "on";

/// Elements removed together with their content.
const DROPPED_TAGS: &[&str] = &["script", "style"];

const VOID_TAGS: &[&str] = &["br"];

/// Sanitizes a markup fragment against the allow-lists.
///
/// Disallowed elements are replaced by their (escaped) text content,
/// `script`/`style` elements are removed entirely, comments are dropped.
/// Applying this function to its own output returns the output unchanged.
pub fn sanitize_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_children(fragment.root_element(), &mut out);
    out
}

fn write_children(parent: ElementRef<'_>, out: &mut String) {
    for child in parent.children() {
        if let Some(element) = ElementRef::wrap(child) {
            write_element(element, out);
            continue;
        }
        if let Node::Text(text) = child.value() {
            out.push_str(&escape_text_node(text));
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    if DROPPED_TAGS.contains(&name) {
        return;
    }

    if !ALLOWED_TAGS.contains(&name) {
        let text: String = element.text().collect();
        out.push_str(&escape_text_node(&text));
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.value().attrs() {
        let attr = attr.to_ascii_lowercase();
        if attr.starts_with(EVENT_HANDLER_PREFIX) || !ALLOWED_ATTRIBUTES.contains(&attr.as_str()) {
            continue;
        }
        if attr == "style" {
            let style = filter_style(value);
            if style.is_empty() {
                continue;
            }
            out.push_str(" style=\"");
            out.push_str(&escape_attribute(&style));
            out.push('"');
        }
    }
    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }

    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Keeps only allow-listed declarations with plain length values.
fn filter_style(style: &str) -> String {
    style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            if !ALLOWED_STYLE_PROPERTIES.contains(&property.as_str()) || !is_plain_length(value) {
                return None;
            }
            Some(format!("{property}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn is_plain_length(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '%' | '-' | ' '))
}
