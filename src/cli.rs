//! Command-line interface definitions for Headline Relay.
//!
//! Every setting can be passed as a flag or through the environment (a `.env`
//! file in the working directory is loaded first). Values left unset here
//! fall back to the optional YAML config file and then to built-in defaults;
//! see [`crate::config::Settings::load`].

use clap::Parser;

/// Command-line arguments for the Headline Relay application.
///
/// # Examples
///
/// ```sh
/// # Everything from the environment
/// NEWS_API_KEY=... TELEGRAM_API_KEY=... TELEGRAM_CHANNEL_ID=@mychannel headline_relay
///
/// # US headlines, stop at the first failed publish
/// headline_relay --country us --fail-fast
///
/// # Check what would be sent without touching the channel
/// headline_relay --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Two-letter country code for top headlines [default: kr]
    #[arg(long, env = "NEWS_COUNTRY")]
    pub country: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_API_KEY", hide_env_values = true)]
    pub telegram_api_key: Option<String>,

    /// Target chat or channel id (e.g. `@mychannel` or `-100123456789`)
    #[arg(long, env = "TELEGRAM_CHANNEL_ID")]
    pub telegram_channel_id: Option<String>,

    /// Misspelled channel id variable still found in older deployments
    #[arg(long = "telgram-channel-id", env = "TELGRAM_CHANNEL_ID", hide = true)]
    pub legacy_channel_id: Option<String>,

    /// Override the NewsAPI base URL [default: https://newsapi.org]
    #[arg(long, env = "NEWS_API_BASE_URL")]
    pub news_api_base_url: Option<String>,

    /// Override the Telegram Bot API base URL [default: https://api.telegram.org]
    #[arg(long, env = "TELEGRAM_API_BASE_URL")]
    pub telegram_api_base_url: Option<String>,

    /// Stop at the first article that fails to publish
    #[arg(long)]
    pub fail_fast: bool,

    /// Fetch and format messages but do not send them
    #[arg(long)]
    pub dry_run: bool,
}
