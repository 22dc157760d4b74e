//! # Headline Relay
//!
//! A one-shot batch job that fetches the current top headlines from
//! [NewsAPI](https://newsapi.org) and republishes each one to a Telegram
//! channel as an HTML link.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... TELEGRAM_API_KEY=... TELEGRAM_CHANNEL_ID=@mychannel headline_relay
//! ```
//!
//! The binary is meant to be triggered periodically by an external scheduler
//! (cron, a systemd timer, ...). It keeps no state between runs, so the same
//! headline may be posted again by a later run.
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags, environment, and an optional YAML file are
//!    resolved once into a [`config::Settings`]
//! 2. **Fetching**: One `GET /v2/top-headlines` call returns the ordered article list
//! 3. **Publishing**: Each article is sent to `sendMessage`, one at a time, in fetch order
//!
//! A configuration or fetch failure exits non-zero. Individual publish
//! failures are logged and skipped unless `--fail-fast` is set.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod headlines;
mod models;
mod publisher;
mod relay;
mod utils;

use cli::Cli;
use config::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env first so RUST_LOG and the API keys in it are visible below.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "headline_relay starting up");

    // A missing .env is the normal case in production.
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load .env; continuing with process environment"),
    }

    let args = Cli::parse();
    debug!(?args.config, args.fail_fast, args.dry_run, "Parsed CLI arguments");

    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let client = utils::http_client()?;

    match relay::run(client, &settings).await {
        Ok(summary) => {
            if summary.skipped > 0 {
                warn!(skipped = summary.skipped, "Some articles had no title or URL");
            }
            if summary.failed > 0 {
                warn!(
                    failed = summary.failed,
                    published = summary.published,
                    "Some articles could not be published"
                );
            }
            info!("Execution complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Relay aborted");
            Err(e.into())
        }
    }
}
