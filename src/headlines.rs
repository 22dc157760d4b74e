//! NewsAPI top-headlines fetcher.
//!
//! Issues a single `GET /v2/top-headlines?country={code}&apiKey={key}` and
//! decodes the body into a [`NewsResponse`]. There is no retry and no status
//! code validation: whatever body comes back goes through the same decode
//! path, and the status is only logged.

use crate::config::Settings;
use crate::error::FetchError;
use crate::models::{Article, NewsResponse};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Fetches top headlines for one country with one API key.
#[derive(Clone)]
pub struct HeadlineFetcher {
    client: Client,
    base_url: Url,
    country: String,
    api_key: String,
}

impl fmt::Debug for HeadlineFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlineFetcher")
            .field("base_url", &self.base_url.as_str())
            .field("country", &self.country)
            .finish()
    }
}

impl HeadlineFetcher {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            base_url: settings.news_api_base_url.clone(),
            country: settings.country.clone(),
            api_key: settings.news_api_key.clone(),
        }
    }

    /// Build the top-headlines URL with `country` and `apiKey` as encoded query parameters.
    pub fn top_headlines_url(&self) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["v2", "top-headlines"]);
        url.query_pairs_mut()
            .append_pair("country", &self.country)
            .append_pair("apiKey", &self.api_key);
        Ok(url)
    }

    /// Fetch the current top headlines, in the order the API returned them.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if the request could not be sent
    /// - [`FetchError::Body`] if the response body could not be read
    /// - [`FetchError::Decode`] if the body is not a `NewsResponse`-shaped JSON object
    ///
    /// An API-level error payload (`status: "error"`) is not an error here: it
    /// decodes to an empty article list and is logged as a warning.
    #[instrument(level = "info", skip_all, fields(country = %self.country))]
    pub async fn fetch_top_headlines(&self) -> Result<Vec<Article>, FetchError> {
        let url = self.top_headlines_url()?;

        // reqwest errors embed the URL, and the URL carries the API key.
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| FetchError::Body(e.without_url()))?;
        debug!(%status, bytes = body.len(), "Received news API response");

        if !status.is_success() {
            warn!(
                %status,
                body = %truncate_for_log(&body, 300),
                "News API returned a non-success status; decoding body anyway"
            );
        }

        let news: NewsResponse = serde_json::from_str(&body)?;

        if news.is_error() {
            warn!(
                code = news.code.as_deref().unwrap_or(""),
                message = news.message.as_deref().unwrap_or(""),
                "News API reported an error"
            );
        }

        info!(
            count = news.articles.len(),
            total_results = news.total_results,
            status = %news.status,
            "Fetched top headlines"
        );
        Ok(news.articles)
    }
}
