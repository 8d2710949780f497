use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub const API_URL_KEY: &str = "FAVORITES_API_URL";
pub const PAGE_SIZE_KEY: &str = "FAVORITES_PAGE_SIZE";
pub const SCROLL_THRESHOLD_KEY: &str = "FAVORITES_SCROLL_THRESHOLD";
pub const SEARCH_DEBOUNCE_KEY: &str = "FAVORITES_SEARCH_DEBOUNCE_MS";
pub const REQUEST_TIMEOUT_KEY: &str = "FAVORITES_REQUEST_TIMEOUT_SECS";
pub const DATABASE_URL_KEY: &str = "FAVORITES_DATABASE_URL";

const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_SCROLL_THRESHOLD: u32 = 100;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
const DEFAULT_DATABASE_URL: &str = "sqlite://favorites.db?mode=rwc";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub page_size: u32,
    pub scroll_threshold: u32,
    /// Zero disables debouncing of search input.
    pub search_debounce: Duration,
    pub request_timeout: Duration,
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(API_URL_KEY))?;

        let page_size: u32 = parse_or(&lookup, PAGE_SIZE_KEY, DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: PAGE_SIZE_KEY,
                value: page_size.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            api_url,
            page_size,
            scroll_threshold: parse_or(&lookup, SCROLL_THRESHOLD_KEY, DEFAULT_SCROLL_THRESHOLD)?,
            search_debounce: Duration::from_millis(parse_or(
                &lookup,
                SEARCH_DEBOUNCE_KEY,
                DEFAULT_SEARCH_DEBOUNCE_MS,
            )?),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                REQUEST_TIMEOUT_KEY,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            database_url: lookup(DATABASE_URL_KEY)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        })
    }
}

/// Reads `.env.local` then `.env`; variables already set win.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    dotenvy::dotenv().ok();
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key).filter(|value| !value.trim().is_empty()) else {
        tracing::debug!("{key} not set, using default: {default}");
        return Ok(default);
    };
    raw.trim().parse().map_err(|error: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: error.to_string(),
    })
}
