//! Telegram channel publisher.
//!
//! Each article becomes one `sendMessage` call carrying an HTML message:
//!
//! ```text
//! <a href="{url}"><b>{title}</b></a>
//! ```
//!
//! Title and URL are inserted verbatim. Telegram's HTML parser decides
//! whether the result is acceptable, and its verdict (`"ok": false`) is only
//! logged along with the rest of the response body.
//!
//! See <https://core.telegram.org/bots/api#sendmessage>.

use crate::config::Settings;
use crate::error::PublishError;
use crate::models::Article;
use crate::relay::PublishAsync;
use crate::utils::{mask_secret, truncate_for_log};
use reqwest::Client;
use reqwest::multipart::Form;
use std::fmt;
use tracing::{debug, info, instrument};
use url::Url;

/// Build the message text for one headline. No HTML escaping is applied.
pub fn format_message(title: &str, url: &str) -> String {
    format!(r#"<a href="{url}"><b>{title}</b></a>"#)
}

/// Sends headlines to a single Telegram chat through the Bot API.
#[derive(Clone)]
pub struct ChannelPublisher {
    client: Client,
    base_url: Url,
    bot_token: String,
    chat_id: String,
}

impl fmt::Debug for ChannelPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelPublisher")
            .field("base_url", &self.base_url.as_str())
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl ChannelPublisher {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            base_url: settings.telegram_api_base_url.clone(),
            bot_token: settings.telegram_api_key.clone(),
            chat_id: settings.telegram_channel_id.clone(),
        }
    }

    /// `{base}/bot{token}/sendMessage`
    pub fn send_message_url(&self) -> Result<Url, PublishError> {
        let mut url = self.base_url.clone();
        // Pushed as a segment rather than joined: a token such as `123:abc`
        // would otherwise parse as a URL scheme.
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&format!("bot{}", self.bot_token))
            .push("sendMessage");
        Ok(url)
    }

    /// Post one headline to the channel and return the raw response body.
    ///
    /// The Bot API's own `ok` flag is not inspected; a rejected message is
    /// still `Ok` here and shows up only in the logged body.
    #[instrument(level = "info", skip_all, fields(chat_id = %self.chat_id))]
    pub async fn publish_article(&self, title: &str, url: &str) -> Result<String, PublishError> {
        let endpoint = self.send_message_url()?;
        let text = format_message(title, url);

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("text", text)
            .text("parse_mode", "HTML")
            .text("disable_web_page_preview", "false");

        debug!(url = %mask_secret(endpoint.as_str(), &self.bot_token), "Sending message");
        let resp = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.without_url()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| PublishError::Body(e.without_url()))?;

        info!(%status, body = %truncate_for_log(&body, 500), "Bot API response");
        Ok(body)
    }
}

impl PublishAsync for ChannelPublisher {
    async fn publish(&self, article: &Article) -> Result<String, PublishError> {
        self.publish_article(&article.title, &article.url).await
    }
}

/// Logs the message each article would produce without sending anything.
#[derive(Debug, Default)]
pub struct DryRunPublisher;

impl PublishAsync for DryRunPublisher {
    async fn publish(&self, article: &Article) -> Result<String, PublishError> {
        let text = format_message(&article.title, &article.url);
        info!(%text, "Dry run; not sending");
        Ok(String::new())
    }
}
