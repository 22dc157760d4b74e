//! Error types for each I/O boundary.
//!
//! Every fallible step returns one of these instead of terminating the
//! process, so the entry point decides whether a failure ends the run or
//! only skips one article.

use thiserror::Error;

/// Configuration could not be assembled into a usable [`crate::config::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was not provided by any source, or was empty.
    #[error("missing required setting `{name}` (set {env} or pass --{flag})")]
    Missing {
        name: &'static str,
        env: &'static str,
        flag: &'static str,
    },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid base URL for {name}: {source}")]
    BaseUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Fetching the top headlines failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid news API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("news API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read news API response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("news API response did not match the expected shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Publishing a single article to the channel failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid bot API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("bot API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read bot API response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// A relay run was cut short.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Fail-fast mode stopped at the article with this position in the fetch order.
    #[error("publishing article {index} ({title:?}) failed: {source}")]
    Publish {
        index: usize,
        title: String,
        #[source]
        source: PublishError,
    },
}
