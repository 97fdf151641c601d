use std::time::Duration;

use tracing::{debug, warn};

use crate::{Error, Result};

/// Pairs scanned when `SYMBOLS` is not set.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "EURUSD=X", "GBPUSD=X", "USDJPY=X", "AUDUSD=X", "USDCAD=X", "NZDUSD=X", "USDCHF=X",
    "EURJPY=X", "GBPJPY=X", "EURGBP=X",
];

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// All configuration loaded from environment variables at startup.
/// Missing credentials are reported as `Error::Config`.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    /// Numeric chat id or `@channel` username.
    pub chat_id: String,

    // Liveness endpoint
    pub port: u16,

    // Scanner
    pub scan_interval: Duration,
    pub cooldown: Duration,
    pub symbols: Vec<String>,

    // Market data
    pub yahoo_base_url: String,
    pub fetch_timeout: Duration,

    /// Optional TOML file with indicator thresholds.
    pub strategy_config_path: Option<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = |key: &str| {
            get(key).ok_or_else(|| {
                Error::Config(format!(
                    "Required environment variable '{key}' is not set. Check your .env file."
                ))
            })
        };

        let symbols = match get("SYMBOLS") {
            Some(raw) => {
                let list: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if list.is_empty() {
                    return Err(Error::Config("SYMBOLS is set but lists no symbols".into()));
                }
                list
            }
            None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Config {
            bot_token: required("BOT_TOKEN")?,
            chat_id: required("CHAT_ID")?,
            port: parse_or(get("PORT"), "PORT", 10_000)?,
            scan_interval: Duration::from_secs(parse_or(
                get("SCAN_INTERVAL_SECS"),
                "SCAN_INTERVAL_SECS",
                60,
            )?),
            cooldown: Duration::from_secs(parse_or(get("COOLDOWN_SECS"), "COOLDOWN_SECS", 300)?),
            symbols,
            yahoo_base_url: get("YAHOO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
            fetch_timeout: Duration::from_secs(parse_or(
                get("FETCH_TIMEOUT_SECS"),
                "FETCH_TIMEOUT_SECS",
                10,
            )?),
            strategy_config_path: get("STRATEGY_CONFIG_PATH"),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} must be a number, got: '{raw}'"))),
        None => Ok(default),
    }
}
