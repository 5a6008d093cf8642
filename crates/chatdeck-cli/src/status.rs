//! `chatdeck status`: show configuration and login state.
//!
//! Read-only: the stored token is checked against the backend but never
//! removed, whatever the outcome.

use anyhow::{Context, Result};
use colored::Colorize;

use chatdeck_client::{ApiResult, ChatApi, HttpApiClient};
use chatdeck_core::config::{get_config_path, Config};
use chatdeck_core::{FileTokenStore, TokenStore};

/// Run the status command.
pub async fn run(config: &Config) -> Result<()> {
    let config_path = get_config_path();
    let store = FileTokenStore::from_config(config.auth.token_file.as_deref());

    println!();
    println!("{}", "💬 Chatdeck Status".cyan().bold());
    println!();

    println!(
        "  {:<14} {} {}",
        "Config:".bold(),
        config_path.display(),
        found(config_path.exists())
    );
    println!("  {:<14} {}", "Backend:".bold(), config.api.base_url);
    println!(
        "  {:<14} {}",
        "Timeout:".bold(),
        format!("{}s", config.api.timeout_secs).dimmed()
    );
    if let Some(location) = &config.chat.location {
        println!("  {:<14} {}", "Location:".bold(), location);
    }

    let token = match store.load() {
        Ok(token) => token,
        Err(e) => {
            println!("  {:<14} {}", "Token:".bold(), e.to_string().red());
            println!();
            return Ok(());
        }
    };
    println!(
        "  {:<14} {} {}",
        "Token:".bold(),
        store.path().display(),
        found(token.is_some())
    );

    if let Some(token) = token {
        let api = HttpApiClient::new(&config.api).context("failed to create HTTP client")?;
        let result = api.validate_token(&token).await;
        println!("  {:<14} {}", "Logged in:".bold(), describe_login(&result));
    }

    println!();
    Ok(())
}

fn describe_login(result: &ApiResult<Option<String>>) -> String {
    match result {
        Ok(username) => format!(
            "{} {}",
            "✓".green(),
            username.as_deref().unwrap_or("(unverified)")
        ),
        Err(e) if e.is_unauthorized() => "✗ token rejected".red().to_string(),
        Err(e) => format!("{} {}", "?".yellow(), e.user_message()),
    }
}

fn found(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
