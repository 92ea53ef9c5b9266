//! Runtime configuration read from the environment.
//!
//! The bot reads its settings once at startup into a [`Config`] value which is
//! then passed explicitly to everything that needs it. A `.env` file is loaded
//! by `main` via `dotenvy` before [`Config::from_env`] runs.

use std::env;
use std::time::Duration;

use teloxide::types::{ChatId, Recipient};

use crate::core::error::ConfigError;

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "steamdb.db";

/// Default log file.
pub const DEFAULT_LOG_FILE_PATH: &str = "app.log";

/// Default Steam Web API base URL.
pub const DEFAULT_STEAM_API_URL: &str = "http://api.steampowered.com";

/// Default base URL of the SteamDB scraper service.
pub const DEFAULT_STEAMDB_SCRAPER_URL: &str = "http://127.0.0.1:8000";

/// TTL and answer-cache policy, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Telegram-side cache for inline answers to queries of two characters or less
    pub short_query: u32,
    /// Telegram-side cache for "not found" inline answers
    pub user_not_found: u32,
    /// Telegram-side cache for found profiles and enrichment callbacks
    pub user_found: u32,
    /// Lifetime of SteamDB enrichment rows in the SQLite cache
    pub enrichment: u64,
    /// Interval between background sweeps of expired cache rows, 0 disables the sweep
    pub sweep_interval: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            short_query: 300,
            user_not_found: 300,
            user_found: 300,
            enrichment: 3600,
            sweep_interval: 600,
        }
    }
}

impl CachePolicy {
    pub fn enrichment_ttl(&self) -> Duration {
        Duration::from_secs(self.enrichment)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }
}

/// Complete bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub steam_api_key: String,
    /// Telegram user allowed to run administrative commands
    pub bot_admin: Option<i64>,
    /// Chat or channel that receives operational notices
    pub log_channel: Option<Recipient>,
    pub cache: CachePolicy,
    pub database_path: String,
    pub log_file_path: String,
    pub steam_api_url: String,
    pub steamdb_scraper_url: String,
    /// Custom Bot API server (local `telegram-bot-api`), if any
    pub bot_api_url: Option<String>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let telegram_token = get("TELEGRAM_TOKEN")
            .or_else(|| get("BOT_TOKEN"))
            .or_else(|| get("TELOXIDE_TOKEN"))
            .ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;
        let steam_api_key = get("STEAM_API_TOKEN").ok_or(ConfigError::Missing("STEAM_API_TOKEN"))?;

        let bot_admin = get("BOT_ADMIN")
            .map(|raw| parse_number::<i64>("BOT_ADMIN", &raw))
            .transpose()?;
        let log_channel = get("LOG_CHANNEL").map(|raw| parse_recipient(&raw)).transpose()?;

        let defaults = CachePolicy::default();
        let cache = CachePolicy {
            short_query: number_or("CACHE_SHORT_QUERY", get("CACHE_SHORT_QUERY"), defaults.short_query)?,
            user_not_found: number_or("CACHE_USER_NOT_FOUND", get("CACHE_USER_NOT_FOUND"), defaults.user_not_found)?,
            user_found: number_or("CACHE_USER_FOUND", get("CACHE_USER_FOUND"), defaults.user_found)?,
            enrichment: number_or("CACHE_DB", get("CACHE_DB"), defaults.enrichment)?,
            sweep_interval: number_or("CACHE_SWEEP_INTERVAL", get("CACHE_SWEEP_INTERVAL"), defaults.sweep_interval)?,
        };

        Ok(Self {
            telegram_token,
            steam_api_key,
            bot_admin,
            log_channel,
            cache,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            steam_api_url: get("STEAM_API_URL").unwrap_or_else(|| DEFAULT_STEAM_API_URL.to_string()),
            steamdb_scraper_url: get("STEAMDB_SCRAPER_URL").unwrap_or_else(|| DEFAULT_STEAMDB_SCRAPER_URL.to_string()),
            bot_api_url: get("BOT_API_URL"),
        })
    }

    /// Returns true if `user_id` may run administrative commands.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.bot_admin == Some(user_id)
    }
}

/// Log file path, readable before the full configuration is validated so that
/// configuration errors themselves end up in the log.
pub fn log_file_path() -> String {
    env::var("LOG_FILE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

fn number_or<T: std::str::FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_number(name, &raw),
        None => Ok(default),
    }
}

fn parse_recipient(raw: &str) -> Result<Recipient, ConfigError> {
    if raw.starts_with('@') {
        return Ok(Recipient::ChannelUsername(raw.to_string()));
    }
    parse_number::<i64>("LOG_CHANNEL", raw).map(|id| Recipient::Id(ChatId(id)))
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Connect timeout for Steam API and scraper requests (in seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 2;

    /// Overall request timeout for Steam API and scraper requests (in seconds)
    pub const READ_TIMEOUT_SECS: u64 = 10;

    /// Request timeout for the Telegram Bot API client (in seconds)
    pub const TELEGRAM_TIMEOUT_SECS: u64 = 60;

    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }

    pub fn read_timeout() -> Duration {
        Duration::from_secs(READ_TIMEOUT_SECS)
    }

    pub fn telegram_timeout() -> Duration {
        Duration::from_secs(TELEGRAM_TIMEOUT_SECS)
    }
}

/// Dispatcher retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for reaching the Bot API at startup
    pub const MAX_STARTUP_RETRIES: u32 = 12;

    /// Delay between startup retry attempts (in seconds)
    pub const STARTUP_RETRY_DELAY_SECS: u64 = 5;

    pub fn startup_delay() -> Duration {
        Duration::from_secs(STARTUP_RETRY_DELAY_SECS)
    }
}
