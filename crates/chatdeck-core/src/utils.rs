//! Utility helpers: data paths and display formatting.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};

/// Get the Chatdeck data directory (e.g. `~/.chatdeck/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".chatdeck")
}

/// Default location of the persisted auth token.
pub fn get_token_path() -> PathBuf {
    get_data_path().join("token")
}

/// Readline history directory.
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Local date of a UTC timestamp, e.g. `2024-06-04`.
pub fn local_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Local wall-clock time of a UTC timestamp, e.g. `14:03:27`.
pub fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths() {
        assert!(get_data_path().ends_with(".chatdeck"));
        assert!(get_token_path().starts_with(get_data_path()));
        assert!(get_history_path().ends_with("history"));
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_string("665f1c2a9b8e7d6c5b4a3921", 10), "665f1c2...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("こんにちは世界です", 5), "こん...");
    }

    #[test]
    fn test_local_formats() {
        let ts = Utc::now();
        assert_eq!(local_date(&ts).len(), 10);
        assert_eq!(local_time(&ts).len(), 8);
    }
}
