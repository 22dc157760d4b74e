//! Runtime configuration, loaded once at startup.
//!
//! Values are layered with the following precedence (highest first):
//!
//! 1. Command-line flag
//! 2. Environment variable (including a `.env` file)
//! 3. YAML config file passed with `--config`
//! 4. Built-in default
//!
//! Layers 1 and 2 are resolved by clap before [`Settings::load`] sees them.
//! Required values that are missing or empty after layering are reported as
//! a [`ConfigError::Missing`] before any request is made.
//!
//! # Config file
//!
//! ```yaml
//! news_api_key: "..."
//! telegram_api_key: "123456:ABC..."
//! telegram_channel_id: "@mychannel"
//! country: us
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_COUNTRY: &str = "kr";
pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

/// Shape of the optional YAML config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub country: Option<String>,
    pub news_api_key: Option<String>,
    pub telegram_api_key: Option<String>,
    pub telegram_channel_id: Option<String>,
    pub news_api_base_url: Option<String>,
    pub telegram_api_base_url: Option<String>,
}

impl FileSettings {
    /// Read and parse a YAML config file.
    #[instrument(level = "debug")]
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a valid, empty config.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Fully resolved settings passed explicitly to the fetcher and publisher.
#[derive(Clone)]
pub struct Settings {
    pub country: String,
    pub news_api_key: String,
    pub telegram_api_key: String,
    pub telegram_channel_id: String,
    pub news_api_base_url: Url,
    pub telegram_api_base_url: Url,
    pub fail_fast: bool,
    pub dry_run: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("country", &self.country)
            .field("news_api_key", &"<redacted>")
            .field("telegram_api_key", &"<redacted>")
            .field("telegram_channel_id", &self.telegram_channel_id)
            .field("news_api_base_url", &self.news_api_base_url.as_str())
            .field("telegram_api_base_url", &self.telegram_api_base_url.as_str())
            .field("fail_fast", &self.fail_fast)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Settings {
    /// Resolve settings from parsed CLI arguments, reading the config file
    /// named by `--config` if there is one.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config.as_deref() {
            Some(path) => FileSettings::from_path(path)?,
            None => FileSettings::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI/env values over file values and validate the result.
    pub fn resolve(cli: &Cli, file: FileSettings) -> Result<Self, ConfigError> {
        let news_api_key = layered(&cli.news_api_key, file.news_api_key).ok_or(ConfigError::Missing {
            name: "news_api_key",
            env: "NEWS_API_KEY",
            flag: "news-api-key",
        })?;

        let telegram_api_key =
            layered(&cli.telegram_api_key, file.telegram_api_key).ok_or(ConfigError::Missing {
                name: "telegram_api_key",
                env: "TELEGRAM_API_KEY",
                flag: "telegram-api-key",
            })?;

        let telegram_channel_id = match non_empty(&cli.telegram_channel_id) {
            Some(id) => Some(id),
            None => match non_empty(&cli.legacy_channel_id) {
                Some(id) => {
                    warn!("TELGRAM_CHANNEL_ID is deprecated; rename it to TELEGRAM_CHANNEL_ID");
                    Some(id)
                }
                None => file.telegram_channel_id.filter(|s| !s.trim().is_empty()),
            },
        }
        .ok_or(ConfigError::Missing {
            name: "telegram_channel_id",
            env: "TELEGRAM_CHANNEL_ID",
            flag: "telegram-channel-id",
        })?;

        let country = layered(&cli.country, file.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

        let news_api_base_url = parse_base(
            "news_api_base_url",
            layered(&cli.news_api_base_url, file.news_api_base_url),
            DEFAULT_NEWS_API_BASE_URL,
        )?;
        let telegram_api_base_url = parse_base(
            "telegram_api_base_url",
            layered(&cli.telegram_api_base_url, file.telegram_api_base_url),
            DEFAULT_TELEGRAM_API_BASE_URL,
        )?;

        let settings = Settings {
            country,
            news_api_key,
            telegram_api_key,
            telegram_channel_id,
            news_api_base_url,
            telegram_api_base_url,
            fail_fast: cli.fail_fast,
            dry_run: cli.dry_run,
        };
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }
}

#[cfg(test)]
impl Settings {
    /// Settings pointing both APIs at the given base URLs, e.g. an `httpmock` server.
    pub fn for_tests(news_api_base_url: &str, telegram_api_base_url: &str) -> Self {
        Settings {
            country: DEFAULT_COUNTRY.to_string(),
            news_api_key: "test-news-key".to_string(),
            telegram_api_key: "123456:test-token".to_string(),
            telegram_channel_id: "@test_channel".to_string(),
            news_api_base_url: Url::parse(news_api_base_url).unwrap(),
            telegram_api_base_url: Url::parse(telegram_api_base_url).unwrap(),
            fail_fast: false,
            dry_run: false,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

/// Prefer the CLI/env value, then the file value. Blank strings count as unset.
fn layered(cli: &Option<String>, file: Option<String>) -> Option<String> {
    non_empty(cli).or_else(|| file.filter(|s| !s.trim().is_empty()))
}

fn parse_base(name: &'static str, value: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = value.as_deref().unwrap_or(default);
    Url::parse(raw).map_err(|source| ConfigError::BaseUrl { name, source })
}
