//! `chatdeck init`: write the default configuration.

use anyhow::{Context, Result};
use colored::Colorize;

use chatdeck_core::config::{get_config_path, save_config, Config};
use chatdeck_core::utils::{get_data_path, get_history_path};

/// Run the init command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "💬 Chatdeck Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    std::fs::create_dir_all(get_history_path())
        .with_context(|| format!("failed to create {}", get_data_path().display()))?;

    println!();
    println!(
        "{}",
        "Edit api.baseUrl to point at your backend, then run `chatdeck login`.".dimmed()
    );
    println!();
    Ok(())
}
