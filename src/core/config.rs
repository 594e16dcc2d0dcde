//! Application configuration
//!
//! Settings come from the process environment, with an optional `.env` file
//! loaded first through `dotenvy`. Every key has a default so the client
//! starts with no configuration at all.
//!
//! | Variable                 | Default                    |
//! |--------------------------|----------------------------|
//! | `CHESS_DATABASE_URL`     | `sqlite://casual_chess.db` |
//! | `CHESS_DEFAULT_LEVEL`    | `3`                        |
//! | `CHESS_CLOCK_SECONDS`    | `600`                      |
//! | `CHESS_RESUME_COUNTDOWN` | `3`                        |
//! | `RUST_LOG`               | `info`                     |

use crate::core::error::{CoreError, CoreResult};
use crate::game::clock::{DEFAULT_CLOCK_SECONDS, RESUME_COUNTDOWN_SECONDS};
use std::str::FromStr;
use tracing::{info, warn};

pub const DATABASE_URL_KEY: &str = "CHESS_DATABASE_URL";
pub const DEFAULT_LEVEL_KEY: &str = "CHESS_DEFAULT_LEVEL";
pub const CLOCK_SECONDS_KEY: &str = "CHESS_CLOCK_SECONDS";
pub const RESUME_COUNTDOWN_KEY: &str = "CHESS_RESUME_COUNTDOWN";
pub const LOG_FILTER_KEY: &str = "RUST_LOG";

/// Runtime settings shared by the CLI and the session coordinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Connection string for the saved-game database
    pub database_url: String,
    /// Difficulty used when none is given on the command line
    pub default_level: u8,
    /// Starting time per side for multiplayer rooms
    pub clock_seconds: u32,
    /// Seconds counted down before a paused game resumes
    pub resume_countdown: u8,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://casual_chess.db".to_string(),
            default_level: 3,
            clock_seconds: DEFAULT_CLOCK_SECONDS,
            resume_countdown: RESUME_COUNTDOWN_SECONDS,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read settings from the environment
    pub fn from_env() -> CoreResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("[CONFIG] Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("[CONFIG] Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    ///
    /// Missing keys keep their defaults; present but malformed values are
    /// an error rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_KEY) {
            config.database_url = url;
        }
        if let Some(level) = parse_setting(&lookup, DEFAULT_LEVEL_KEY)? {
            config.default_level = level;
        }
        if let Some(seconds) = parse_setting(&lookup, CLOCK_SECONDS_KEY)? {
            config.clock_seconds = seconds;
        }
        if let Some(countdown) = parse_setting(&lookup, RESUME_COUNTDOWN_KEY)? {
            config.resume_countdown = countdown;
        }
        if let Some(filter) = lookup(LOG_FILTER_KEY) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

fn parse_setting<F, T>(lookup: &F, key: &str) -> CoreResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| CoreError::InvalidSetting {
            key: key.to_string(),
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.clock_seconds, 600);
        assert_eq!(config.resume_countdown, 3);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_KEY, "sqlite::memory:"),
            (DEFAULT_LEVEL_KEY, "7"),
            (CLOCK_SECONDS_KEY, " 180 "),
            (RESUME_COUNTDOWN_KEY, "5"),
            (LOG_FILTER_KEY, "casual_chess=debug"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.default_level, 7);
        assert_eq!(config.clock_seconds, 180);
        assert_eq!(config.resume_countdown, 5);
        assert_eq!(config.log_filter, "casual_chess=debug");
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(CLOCK_SECONDS_KEY, "ten minutes")]))
            .unwrap_err();
        match err {
            CoreError::InvalidSetting { key, value } => {
                assert_eq!(key, CLOCK_SECONDS_KEY);
                assert_eq!(value, "ten minutes");
            }
        }
    }
}
