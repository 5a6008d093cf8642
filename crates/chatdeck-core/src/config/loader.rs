//! Config loader: reads `~/.chatdeck/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.chatdeck/config.json`
//! 3. Environment variables `CHATDECK_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `CHATDECK_API__BASE_URL` → `api.base_url`
/// - `CHATDECK_API__TIMEOUT_SECS` → `api.timeout_secs`
/// - `CHATDECK_AUTH__VALIDATE_ON_START` → `auth.validate_on_start`
/// - `CHATDECK_AUTH__TOKEN_FILE` → `auth.token_file`
/// - `CHATDECK_CHAT__LOCATION` → `chat.location`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("CHATDECK_API__BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CHATDECK_API__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.api.timeout_secs = n,
            Err(_) => warn!("Ignoring invalid CHATDECK_API__TIMEOUT_SECS={}", val),
        }
    }

    if let Ok(val) = std::env::var("CHATDECK_AUTH__VALIDATE_ON_START") {
        config.auth.validate_on_start = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("CHATDECK_AUTH__TOKEN_FILE") {
        config.auth.token_file = Some(PathBuf::from(val));
    }

    if let Ok(val) = std::env::var("CHATDECK_CHAT__LOCATION") {
        config.chat.location = (!val.is_empty()).then_some(val);
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
