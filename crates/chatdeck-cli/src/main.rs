//! Chatdeck CLI: entry point.
//!
//! # Commands
//!
//! - `chatdeck [chat]`: interactive chat (logs in first if needed)
//! - `chatdeck login [-u USER]` / `register` / `logout`
//! - `chatdeck sessions`: list chat sessions
//! - `chatdeck status`: show configuration and login state
//! - `chatdeck init`: write the default config

mod auth_cmd;
mod helpers;
mod init;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chatdeck_app::{App, RouteDecision};
use chatdeck_client::HttpApiClient;
use chatdeck_core::config::{load_config, Config};
use chatdeck_core::FileTokenStore;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Chatdeck: terminal client for the chat backend
#[derive(Parser)]
#[command(name = "chatdeck", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively (default)
    Chat,

    /// Log in and store the token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Remove the stored token
    Logout,

    /// List chat sessions
    Sessions,

    /// Show configuration and login state
    Status,

    /// Write the default configuration file
    Init,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config = load_config(None);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let app = build_app(&config)?;
            repl::run(app).await
        }
        Commands::Login { username } => {
            let mut app = build_app(&config)?;
            auth_cmd::login(&mut app, username).await
        }
        Commands::Register { username, email } => {
            let mut app = build_app(&config)?;
            auth_cmd::register(&mut app, username, email).await
        }
        Commands::Logout => {
            let mut app = build_app(&config)?;
            app.logout().await;
            println!("Logged out.");
            Ok(())
        }
        Commands::Sessions => {
            let app = build_app(&config)?;
            list_sessions(app).await
        }
        Commands::Status => status::run(&config).await,
        Commands::Init => init::run(),
    }
}

/// Wire the HTTP client and token file into an `App`.
pub fn build_app(config: &Config) -> Result<App> {
    let api = HttpApiClient::new(&config.api).context("failed to create HTTP client")?;
    let tokens = FileTokenStore::from_config(config.auth.token_file.as_deref());
    Ok(App::new(Arc::new(api), Arc::new(tokens), config))
}

async fn list_sessions(mut app: App) -> Result<()> {
    if app.start().await != RouteDecision::Render(chatdeck_app::Route::Chat) {
        if let Some(notice) = app.shell.take_notice() {
            anyhow::bail!("{notice}");
        }
        anyhow::bail!("not logged in, run `chatdeck login` first");
    }
    helpers::print_sessions(app.sidebar.sessions(), app.chat.session_id());
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "chatdeck=debug,chatdeck_core=debug,chatdeck_client=debug,chatdeck_app=debug,info",
        )
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
