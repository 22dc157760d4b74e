//! Small helpers shared by the fetcher, publisher, and entry point.
//!
//! - Building the single HTTP client used for the whole run
//! - Truncating response bodies for log lines
//! - Masking the bot token out of URLs before they are logged

use reqwest::Client;
use tracing::instrument;

/// User agent sent with every request. NewsAPI rejects requests without one.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the fetcher and the publisher.
///
/// No timeouts are configured; a hung request blocks the run.
#[instrument(level = "debug")]
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, backing off to the nearest
/// character boundary, with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Replace every occurrence of `secret` in `s` with a fixed mask.
///
/// Telegram puts the bot token in the request path, so request URLs and
/// reqwest errors (which embed the URL) go through this before logging.
pub fn mask_secret(s: &str, secret: &str) -> String {
    if secret.is_empty() {
        return s.to_string();
    }
    s.replace(secret, "<redacted>")
}
