//! `ViewSink` drawing the widget into a terminal.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use scraper::{ElementRef, Html, Node};
use webchat_core::config::WidgetConfig;
use webchat_core::render::SafeMarkup;
use webchat_core::session::Sender;
use webchat_core::view::ViewSink;

/// Converts sanitized markup to plain terminal text.
///
/// Line breaks become newlines, list blocks become indented lines and the
/// remaining inline tags are dropped.
pub fn markup_to_text(markup: &SafeMarkup) -> String {
    let fragment = Html::parse_fragment(markup.as_str());
    let mut text = String::new();
    write_text(fragment.root_element(), &mut text);

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_text(parent: ElementRef<'_>, out: &mut String) {
    for child in parent.children() {
        if let Node::Text(text) = child.value() {
            out.push_str(text);
            continue;
        }
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "br" => out.push('\n'),
            "div" => {
                out.push_str("\n  ");
                write_text(element, out);
                out.push('\n');
            }
            _ => write_text(element, out),
        }
    }
}

pub struct TerminalView {
    agent_name: String,
    welcome: Vec<String>,
}

impl TerminalView {
    /// Builds the view from the display (escaped) configuration.
    pub fn new(display: &WidgetConfig) -> Self {
        let unescape = |s: &str| markup_to_text(&SafeMarkup::sanitize(s));
        let mut welcome = vec![
            unescape(&display.welcome_message),
            unescape(&display.subtitle),
        ];
        for (index, button) in display.action_buttons.iter().enumerate() {
            welcome.push(format!("  /{} {}", index + 1, unescape(&button.label)));
        }
        Self {
            agent_name: unescape(&display.agent_name),
            welcome,
        }
    }
}

impl ViewSink for TerminalView {
    fn show_welcome(&self) {
        println!();
        for (index, line) in self.welcome.iter().enumerate() {
            if index == 0 {
                println!("{}", line.bright_magenta().bold());
            } else {
                println!("{}", line.bright_black());
            }
        }
        println!();
    }

    fn show_conversation(&self) {
        println!("{}", "--- conversation ---".bright_black());
    }

    fn append_message(&self, sender: Sender, markup: &SafeMarkup) {
        let text = markup_to_text(markup);
        match sender {
            Sender::User => {
                for line in text.lines() {
                    println!("{}", format!("> {}", line).green());
                }
            }
            Sender::Bot => {
                println!("{}", format!("[{}]", self.agent_name).bright_magenta());
                for line in text.lines() {
                    println!("{}", line.bright_blue());
                }
            }
        }
    }

    fn clear_messages(&self) {
        println!("{}", "--- cleared ---".bright_black());
    }

    fn show_typing(&self) {
        println!("{}", format!("{} is typing...", self.agent_name).bright_black());
    }

    fn hide_typing(&self) {}

    // Input is read synchronously between turns.
    fn set_input_enabled(&self, _enabled: bool) {}

    fn clear_input(&self) {}

    fn focus_input(&self) {}

    fn set_panel_open(&self, open: bool) {
        if open {
            println!("{}", "(panel opened)".bright_black());
        } else {
            println!("{}", "(panel closed)".bright_black());
        }
    }

    fn scroll_to_latest(&self) {}

    fn confirm(&self, prompt: &str) -> bool {
        print!("{} {} ", prompt.yellow(), "[y/N]".bright_black());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use webchat_core::render::render;

    #[test]
    fn test_markup_to_text() {
        let markup = render("**Options**\n1. Clean\n- Seal <tag> & more");
        assert_eq!(
            markup_to_text(&markup),
            "Options\n  1. Clean\n  • Seal <tag> & more"
        );
    }

    #[test]
    fn test_markup_to_text_decodes_entities() {
        assert_eq!(
            markup_to_text(&render(r#"a < b & "c" it's"#)),
            r#"a < b & "c" it's"#
        );
    }

    #[test]
    fn test_welcome_labels_are_unescaped() {
        let mut config = WidgetConfig::default();
        config.action_buttons[0].label = "Q&A".to_string();
        let view = TerminalView::new(&config.sanitized());
        assert_eq!(view.welcome[2], "  /1 Q&A");
    }
}
