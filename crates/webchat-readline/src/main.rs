use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use webchat_application::{TurnOutcome, WidgetController};
use webchat_core::config::WidgetConfig;
use webchat_infrastructure::{WebchatPaths, load_config_file};

mod terminal_view;

use terminal_view::TerminalView;

const COMMANDS: [&str; 5] = ["/open", "/close", "/clear", "/help", "/quit"];

/// REPL helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct ReplHelper {
    commands: Vec<String>,
}

impl ReplHelper {
    fn new(button_count: usize) -> Self {
        let mut commands: Vec<String> = COMMANDS.iter().map(|c| c.to_string()).collect();
        commands.extend((1..=button_count).map(|n| format!("/{}", n)));
        Self { commands }
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ReplHelper {}

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Open,
    Close,
    Clear,
    Help,
    Quit,
    Action(usize),
    Message(String),
    Unknown(String),
}

fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    match trimmed {
        "/open" => ReplCommand::Open,
        "/close" => ReplCommand::Close,
        "/clear" => ReplCommand::Clear,
        "/help" => ReplCommand::Help,
        "/quit" | "quit" | "exit" => ReplCommand::Quit,
        _ => match trimmed.strip_prefix('/') {
            Some(rest) => match rest.parse::<usize>() {
                Ok(n) if n > 0 => ReplCommand::Action(n - 1),
                _ => ReplCommand::Unknown(trimmed.to_string()),
            },
            None => ReplCommand::Message(line.to_string()),
        },
    }
}

fn print_help() {
    println!(
        "{}",
        "Type a message and press Enter. /N starts with welcome button N, /clear resets, /quit exits."
            .bright_black()
    );
}

/// Loads the unsanitized configuration; the widget derives its own
/// display copy.
fn load_config() -> Result<WidgetConfig> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WEBCHAT_CONFIG").ok())
        .map(PathBuf::from);

    let path = match explicit {
        Some(path) => path,
        None => {
            let path = WebchatPaths::config_file()?;
            if !path.exists() {
                return Ok(WidgetConfig::default());
            }
            path
        }
    };
    load_config_file(&path)
        .with_context(|| format!("Failed to load widget configuration from {}", path.display()))
}

/// The main entry point for the webchat terminal host.
///
/// Mounts one widget instance with a terminal view and drives it from a
/// rustyline REPL: each line is either a command or a message to send.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Widget Initialization =====
    let config = load_config()?;
    let view = Arc::new(TerminalView::new(&config.sanitized()));
    let widget = WidgetController::builder(config)
        .view(view.clone())
        .build()?;
    let buttons = widget.config().action_buttons.clone();

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper::new(buttons.len())));

    println!("{}", "=== Webchat REPL ===".bright_magenta().bold());
    print_help();

    widget.mount().await?;
    widget.open().await?;

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let command = parse_line(&line);
                if !matches!(command, ReplCommand::Message(ref m) if m.trim().is_empty()) {
                    let _ = rl.add_history_entry(&line);
                }

                let outcome = match command {
                    ReplCommand::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    ReplCommand::Help => {
                        print_help();
                        continue;
                    }
                    ReplCommand::Open => {
                        widget.open().await?;
                        continue;
                    }
                    ReplCommand::Close => {
                        widget.close();
                        continue;
                    }
                    ReplCommand::Clear => {
                        if let Some(id) = widget.clear().await? {
                            tracing::debug!(session_id = %id, "Cleared from REPL");
                        }
                        continue;
                    }
                    ReplCommand::Unknown(cmd) => {
                        println!("{}", format!("Unknown command: {}", cmd).bright_black());
                        continue;
                    }
                    ReplCommand::Action(index) => match buttons.get(index) {
                        Some(button) => widget.click_action(&button.label, &button.action).await,
                        None => {
                            println!("{}", "No such button".bright_black());
                            continue;
                        }
                    },
                    ReplCommand::Message(text) => {
                        if !widget.is_open() {
                            widget.open().await?;
                        }
                        widget.submit(&text).await
                    }
                };

                match outcome {
                    Ok(TurnOutcome::Busy) => {
                        println!("{}", "Still waiting for the previous reply".yellow());
                    }
                    Ok(_) => {}
                    Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("/clear"), ReplCommand::Clear);
        assert_eq!(parse_line(" /2 "), ReplCommand::Action(1));
        assert_eq!(parse_line("/0"), ReplCommand::Unknown("/0".to_string()));
        assert_eq!(parse_line("/nope"), ReplCommand::Unknown("/nope".to_string()));
        assert_eq!(
            parse_line("what are your hours?"),
            ReplCommand::Message("what are your hours?".to_string())
        );
        assert_eq!(parse_line("exit"), ReplCommand::Quit);
    }

    #[test]
    fn test_helper_lists_button_shortcuts() {
        let helper = ReplHelper::new(2);
        assert!(helper.commands.contains(&"/1".to_string()));
        assert!(helper.commands.contains(&"/2".to_string()));
        assert!(!helper.commands.contains(&"/3".to_string()));
    }
}
