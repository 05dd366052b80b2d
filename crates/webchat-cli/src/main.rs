use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "webchat")]
#[command(about = "Webchat CLI - render messages and manage widget configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render message text through the safe Markdown pipeline
    Render {
        /// Text to render; read from stdin when omitted
        text: Option<String>,
    },
    /// Inspect and convert widget configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load a config file (TOML or JSON) and print the sanitized result
    Check {
        /// Config file; defaults to the platform config location
        path: Option<PathBuf>,
    },
    /// Build the page injection script from CMS site settings (JSON)
    Inject {
        /// Site settings file
        settings: PathBuf,
        /// Public URL of the site
        #[arg(long, default_value = "")]
        site_url: String,
        /// Page title and URL reported in metadata
        #[arg(long, default_value = "")]
        page: String,
        /// Visitor user agent reported in metadata
        #[arg(long, default_value = "")]
        user_agent: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { text } => commands::render::run(text)?,
        Commands::Config { action } => match action {
            ConfigAction::Check { path } => commands::config::check(path)?,
            ConfigAction::Inject {
                settings,
                site_url,
                page,
                user_agent,
            } => commands::config::inject(&settings, site_url, page, user_agent)?,
        },
    }

    Ok(())
}
