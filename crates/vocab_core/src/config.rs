//! Runtime configuration resolved from `VOCAB_*` environment variables.
//!
//! # Invariants
//! - Blank or unparsable values fall back to their defaults.
//! - Derived paths (`db`, `exports`, `logs`, preferences) hang off the data dir
//!   unless overridden individually.

use crate::logging::LogLevel;
use crate::undo::DEFAULT_UNDO_WINDOW;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "VOCAB_DATA_DIR";
pub const ENV_DB_PATH: &str = "VOCAB_DB_PATH";
pub const ENV_EXPORT_DIR: &str = "VOCAB_EXPORT_DIR";
pub const ENV_LOG_DIR: &str = "VOCAB_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "VOCAB_LOG_LEVEL";
pub const ENV_UNDO_WINDOW_MS: &str = "VOCAB_UNDO_WINDOW_MS";
pub const ENV_SEED: &str = "VOCAB_SEED";

const DATA_DIR_NAME: &str = "vocabulary";
const DB_FILE_NAME: &str = "vocabularies.sqlite3";
const EXPORT_DIR_NAME: &str = "exports";
const LOG_DIR_NAME: &str = "logs";
const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
    pub preferences_path: PathBuf,
    pub log_level: LogLevel,
    pub undo_window: Duration,
    pub seed_on_first_run: bool,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            export_dir: data_dir.join(EXPORT_DIR_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            preferences_path: data_dir.join(PREFERENCES_FILE_NAME),
            log_level: LogLevel::build_default(),
            undo_window: DEFAULT_UNDO_WINDOW,
            seed_on_first_run: true,
            data_dir,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let data_dir = value(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DATA_DIR_NAME));
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(path) = value(ENV_EXPORT_DIR) {
            config.export_dir = PathBuf::from(path);
        }
        if let Some(path) = value(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(path);
        }
        if let Some(raw) = value(ENV_LOG_LEVEL) {
            match LogLevel::parse(&raw) {
                Ok(level) => config.log_level = level,
                Err(_) => warn!("event=config_fallback module=config status=ok key={ENV_LOG_LEVEL}"),
            }
        }
        if let Some(raw) = value(ENV_UNDO_WINDOW_MS) {
            match raw.parse::<u64>() {
                Ok(millis) => config.undo_window = Duration::from_millis(millis),
                Err(_) => {
                    warn!("event=config_fallback module=config status=ok key={ENV_UNDO_WINDOW_MS}")
                }
            }
        }
        if let Some(raw) = value(ENV_SEED) {
            match parse_flag(&raw) {
                Some(flag) => config.seed_on_first_run = flag,
                None => warn!("event=config_fallback module=config status=ok key={ENV_SEED}"),
            }
        }
        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ENV_DATA_DIR, ENV_DB_PATH, ENV_SEED, ENV_UNDO_WINDOW_MS};
    use crate::logging::LogLevel;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn paths_derive_from_data_dir() {
        let config = config(&[(ENV_DATA_DIR, "/srv/vocab")]);
        assert_eq!(config.db_path, PathBuf::from("/srv/vocab/vocabularies.sqlite3"));
        assert_eq!(config.export_dir, PathBuf::from("/srv/vocab/exports"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/vocab/logs"));
        assert_eq!(
            config.preferences_path,
            PathBuf::from("/srv/vocab/preferences.json")
        );
    }

    #[test]
    fn overrides_and_defaults() {
        let config = config(&[
            (ENV_DATA_DIR, "/srv/vocab"),
            (ENV_DB_PATH, " /tmp/other.sqlite3 "),
            (ENV_UNDO_WINDOW_MS, "500"),
            (ENV_SEED, "off"),
            ("VOCAB_LOG_LEVEL", "WARNING"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.sqlite3"));
        assert_eq!(config.undo_window, Duration::from_millis(500));
        assert!(!config.seed_on_first_run);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn blank_and_garbage_values_fall_back() {
        let config = config(&[
            (ENV_DATA_DIR, "   "),
            (ENV_UNDO_WINDOW_MS, "soon"),
            (ENV_SEED, "maybe"),
            ("VOCAB_LOG_LEVEL", "loud"),
        ]);
        assert_eq!(config.data_dir, std::env::temp_dir().join("vocabulary"));
        assert_eq!(config.undo_window, Duration::from_millis(2750));
        assert!(config.seed_on_first_run);
        assert_eq!(config.log_level, LogLevel::build_default());
    }
}
