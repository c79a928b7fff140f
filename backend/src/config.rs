use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::notify::RecipientId;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_OZON_API_URL: &str = "https://api-seller.ozon.ru";
pub const DEFAULT_ANALYTICS_LIMIT: u32 = 100;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DATA_LOG_PATH: &str = "ozon_data_log.csv";
pub const DEFAULT_ACTIVITY_LOG_FILE: &str = "bot_activity.log";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to load env file {}: {reason}", path.display())]
    EnvFile { path: PathBuf, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    // =========================
    // Notification sink
    // =========================
    /// Bot token for the Telegram Bot API.
    pub telegram_token: String,

    /// Base URL of the Bot API. Overridable for self-hosted bot servers.
    pub telegram_api_url: String,

    /// Chats that receive every report.
    pub recipients: Vec<RecipientId>,

    // =========================
    // Analytics source
    // =========================
    /// Seller API key (`Api-Key` header).
    pub ozon_api_token: String,

    /// Seller client id (`Client-Id` header).
    pub ozon_client_id: String,

    pub ozon_api_url: String,

    /// Maximum number of SKU rows requested per poll.
    pub analytics_limit: u32,

    /// Request timeout shared by both HTTP clients.
    pub http_timeout: Duration,

    // =========================
    // Evaluation and scheduling
    // =========================
    /// Minimum acceptable conversion rate, in percent.
    pub conversion_threshold: u32,

    /// Delay between the end of one cycle and the start of the next.
    pub poll_interval: Duration,

    // =========================
    // Persistence and logging
    // =========================
    /// CSV data log, used unless `database_url` is set.
    pub data_log_path: PathBuf,

    /// SQLite URL for the data log, e.g. `sqlite://cartwatch.db?mode=rwc`.
    pub database_url: Option<String>,

    /// Plain-text copy of the activity log. `None` disables it.
    pub activity_log: Option<PathBuf>,

    /// Emit JSON logs (`APP_ENV=production`).
    pub json_logs: bool,
}

impl AppConfig {
    /// Loads `./.env` when there is one, then reads the process environment.
    /// Variables already set win over the file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_process_env()
    }

    /// Like `from_env`, but the file is named explicitly and must load.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_process_env()
    }

    fn from_process_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let activity_log = match lookup("ACTIVITY_LOG_FILE") {
            None => Some(PathBuf::from(DEFAULT_ACTIVITY_LOG_FILE)),
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v.trim())),
        };

        Ok(Self {
            telegram_token: require("TELEGRAM_TOKEN")?,
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            recipients: parse_recipients(&require("USER_IDS")?)?,

            ozon_api_token: require("OZON_API_TOKEN")?,
            ozon_client_id: require("CLIENT_ID")?,
            ozon_api_url: get("OZON_API_URL").unwrap_or_else(|| DEFAULT_OZON_API_URL.to_string()),
            analytics_limit: parse_or("ANALYTICS_LIMIT", get("ANALYTICS_LIMIT"), DEFAULT_ANALYTICS_LIMIT)?,
            http_timeout: Duration::from_secs(parse_or(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),

            conversion_threshold: parse_value(
                "CONVERSION_THRESHOLD_VALUE",
                &require("CONVERSION_THRESHOLD_VALUE")?,
            )?,
            poll_interval: Duration::from_secs(parse_or(
                "DELAY",
                get("DELAY"),
                DEFAULT_POLL_INTERVAL_SECS,
            )?),

            data_log_path: get("DATA_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_LOG_PATH)),
            database_url: get("DATABASE_URL"),
            activity_log,
            json_logs: get("APP_ENV").is_some_and(|v| v == "production"),
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("telegram_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("recipients", &self.recipients)
            .field("ozon_api_token", &"<redacted>")
            .field("ozon_client_id", &self.ozon_client_id)
            .field("ozon_api_url", &self.ozon_api_url)
            .field("analytics_limit", &self.analytics_limit)
            .field("http_timeout", &self.http_timeout)
            .field("conversion_threshold", &self.conversion_threshold)
            .field("poll_interval", &self.poll_interval)
            .field("data_log_path", &self.data_log_path)
            .field("database_url", &self.database_url)
            .field("activity_log", &self.activity_log)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

fn parse_recipients(raw: &str) -> Result<Vec<RecipientId>, ConfigError> {
    raw.split(',')
        .map(|part| parse_value("USER_IDS", part.trim()))
        .collect()
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(v) => parse_value(key, &v),
        None => Ok(default),
    }
}
