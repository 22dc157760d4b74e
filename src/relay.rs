//! The fetch-then-publish driver.
//!
//! # Architecture
//!
//! - [`PublishAsync`]: Core trait for anything that can publish one article
//! - [`relay_articles`]: Feeds articles to a publisher one at a time, in order
//! - [`run`]: Wires a [`HeadlineFetcher`] to the configured publisher
//!
//! # Failure Policy
//!
//! A failed fetch ends the run before anything is published. Articles with
//! an empty title or URL are skipped and counted, never sent. A failed
//! publish is logged and counted, and the next article is attempted, unless
//! [`FailurePolicy::FailFast`] is selected, in which case the run stops and
//! the remaining articles are never attempted.

use crate::config::Settings;
use crate::error::{PublishError, RelayError};
use crate::headlines::HeadlineFetcher;
use crate::models::Article;
use crate::publisher::{ChannelPublisher, DryRunPublisher};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Trait for publishing a single article.
///
/// Implementors send (or pretend to send) one message per call and return
/// the raw response body.
pub trait PublishAsync {
    async fn publish(&self, article: &Article) -> Result<String, PublishError>;
}

/// What to do when one article fails to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and move on to the next article.
    Continue,
    /// Stop at the first failure.
    FailFast,
}

impl FailurePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Continue
        }
    }
}

/// Counts for one relay run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    /// Sent to the channel, or only formatted and logged when `dry_run` is set.
    pub published: usize,
    pub failed: usize,
    /// Articles without a title or URL.
    pub skipped: usize,
    pub dry_run: bool,
}

/// Publish `articles` in order, one at a time.
///
/// # Errors
///
/// Only under [`FailurePolicy::FailFast`]: [`RelayError::Publish`] for the
/// first article that failed.
#[instrument(level = "info", skip_all, fields(count = articles.len(), policy = ?policy))]
pub async fn relay_articles<P>(
    articles: &[Article],
    publisher: &P,
    policy: FailurePolicy,
) -> Result<RunSummary, RelayError>
where
    P: PublishAsync,
{
    let mut summary = RunSummary {
        fetched: articles.len(),
        ..RunSummary::default()
    };

    for (index, article) in articles.iter().enumerate() {
        debug!(
            index,
            title = %article.title,
            url = %article.url,
            source = %article.source.name,
            published_at = ?article.published_at_utc(),
            "Publishing article"
        );
        if !article.is_publishable() {
            summary.skipped += 1;
            warn!(index, title = %article.title, url = %article.url, "Article has no title or URL; skipping");
            continue;
        }
        match publisher.publish(article).await {
            Ok(_) => summary.published += 1,
            Err(e) => {
                summary.failed += 1;
                error!(index, title = %article.title, error = %e, "Failed to publish article");
                if policy == FailurePolicy::FailFast {
                    return Err(RelayError::Publish {
                        index,
                        title: article.title.clone(),
                        source: e,
                    });
                }
            }
        }
    }

    Ok(summary)
}

/// Fetch the top headlines and publish each one to the channel.
#[instrument(level = "info", skip_all, fields(country = %settings.country, dry_run = settings.dry_run))]
pub async fn run(client: Client, settings: &Settings) -> Result<RunSummary, RelayError> {
    let t0 = Instant::now();
    let policy = FailurePolicy::from_fail_fast(settings.fail_fast);

    let fetcher = HeadlineFetcher::new(client.clone(), settings);
    let articles = fetcher.fetch_top_headlines().await?;

    let mut summary = if settings.dry_run {
        relay_articles(&articles, &DryRunPublisher, policy).await?
    } else {
        let publisher = ChannelPublisher::new(client, settings);
        relay_articles(&articles, &publisher, policy).await?
    };
    summary.dry_run = settings.dry_run;

    let elapsed = t0.elapsed();
    info!(
        fetched = summary.fetched,
        published = summary.published,
        failed = summary.failed,
        skipped = summary.skipped,
        dry_run = summary.dry_run,
        elapsed_ms = elapsed.as_millis() as u64,
        "Relay finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use std::sync::Mutex;

    /// Records every publish call; fails on titles listed in `fail_on`.
    #[derive(Default)]
    struct RecordingPublisher {
        calls: Mutex<Vec<String>>,
        fail_on: Vec<&'static str>,
    }

    impl PublishAsync for RecordingPublisher {
        async fn publish(&self, article: &Article) -> Result<String, PublishError> {
            self.calls.lock().unwrap().push(article.title.clone());
            if self.fail_on.contains(&article.title.as_str()) {
                return Err(PublishError::Url(url::ParseError::EmptyHost));
            }
            Ok(r#"{"ok":true}"#.to_string())
        }
    }

    fn articles(titles: &[&str]) -> Vec<Article> {
        let items: Vec<String> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!(r#"{{"title":"{t}","url":"https://example.com/{i}"}}"#))
            .collect();
        let body = format!(r#"{{"status":"ok","totalResults":{},"articles":[{}]}}"#, titles.len(), items.join(","));
        serde_json::from_str::<crate::models::NewsResponse>(&body).unwrap().articles
    }

    #[tokio::test]
    async fn test_publishes_each_article_in_order() {
        let publisher = RecordingPublisher::default();
        let input = articles(&["one", "two", "three", "four"]);

        let summary = relay_articles(&input, &publisher, FailurePolicy::Continue).await.unwrap();

        assert_eq!(*publisher.calls.lock().unwrap(), ["one", "two", "three", "four"]);
        assert_eq!(
            summary,
            RunSummary {
                fetched: 4,
                published: 4,
                ..RunSummary::default()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_articles_publish_nothing() {
        let publisher = RecordingPublisher::default();
        let summary = relay_articles(&[], &publisher, FailurePolicy::Continue).await.unwrap();

        assert!(publisher.calls.lock().unwrap().is_empty());
        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test]
    async fn test_continue_policy_skips_failures() {
        let publisher = RecordingPublisher {
            fail_on: vec!["two"],
            ..Default::default()
        };
        let input = articles(&["one", "two", "three"]);

        let summary = relay_articles(&input, &publisher, FailurePolicy::Continue).await.unwrap();

        assert_eq!(*publisher.calls.lock().unwrap(), ["one", "two", "three"]);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_failure() {
        let publisher = RecordingPublisher {
            fail_on: vec!["two"],
            ..Default::default()
        };
        let input = articles(&["one", "two", "three"]);

        let err = relay_articles(&input, &publisher, FailurePolicy::FailFast)
            .await
            .unwrap_err();

        assert_eq!(*publisher.calls.lock().unwrap(), ["one", "two"]);
        match err {
            RelayError::Publish { index, title, .. } => {
                assert_eq!(index, 1);
                assert_eq!(title, "two");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_articles_without_title_or_url_are_skipped() {
        let publisher = RecordingPublisher::default();
        let mut input = articles(&["one", "", "three", "four"]);
        input[3].url = String::new();

        let summary = relay_articles(&input, &publisher, FailurePolicy::FailFast).await.unwrap();

        assert_eq!(*publisher.calls.lock().unwrap(), ["one", "three"]);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_run_null_title_does_not_drop_batch() {
        let news = MockServer::start();
        let telegram = MockServer::start();

        news.mock(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200).body(
                r#"{"status":"ok","totalResults":3,"articles":[{"title":null,"url":"https://a/1","publishedAt":null},{"title":"b","url":"https://a/2","publishedAt":null},{"title":"c","url":"https://a/3"}]}"#,
            );
        });
        let send_mock = telegram.mock(|when, then| {
            when.method(POST).path("/bot123456:test-token/sendMessage");
            then.status(200).body(r#"{"ok":true}"#);
        });

        let settings = Settings::for_tests(&news.base_url(), &telegram.base_url());
        let summary = run(Client::new(), &settings).await.unwrap();

        send_mock.assert_calls(2);
        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let news = MockServer::start();
        let telegram = MockServer::start();

        let fetch_mock = news.mock(|when, then| {
            when.method(GET)
                .path("/v2/top-headlines")
                .query_param("country", "kr")
                .query_param("apiKey", "test-news-key");
            then.status(200).body(
                r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":"google-news","name":"Google News"},"title":"Example Headline","url":"https://example.com/a","publishedAt":"2023-01-01T00:00:00Z"}]}"#,
            );
        });
        let send_mock = telegram.mock(|when, then| {
            when.method(POST)
                .path("/bot123456:test-token/sendMessage")
                .body_includes(r#"<a href="https://example.com/a"><b>Example Headline</b></a>"#);
            then.status(200).body(r#"{"ok":true}"#);
        });

        let settings = Settings::for_tests(&news.base_url(), &telegram.base_url());
        let summary = run(Client::new(), &settings).await.unwrap();

        fetch_mock.assert();
        send_mock.assert_calls(1);
        assert_eq!(summary.published, 1);
        assert!(!summary.dry_run);
    }

    #[tokio::test]
    async fn test_run_fetch_failure_publishes_nothing() {
        let news = MockServer::start();
        let telegram = MockServer::start();

        news.mock(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200).body("not json");
        });
        let send_mock = telegram.mock(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"ok":true}"#);
        });

        let settings = Settings::for_tests(&news.base_url(), &telegram.base_url());
        let err = run(Client::new(), &settings).await.unwrap_err();

        assert!(matches!(err, RelayError::Fetch(_)));
        send_mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_run_dry_run_sends_nothing() {
        let news = MockServer::start();
        let telegram = MockServer::start();

        news.mock(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200).body(
                r#"{"status":"ok","totalResults":2,"articles":[{"title":"a","url":"https://a"},{"title":"b","url":"https://b"}]}"#,
            );
        });
        let send_mock = telegram.mock(|when, then| {
            when.method(POST);
            then.status(200).body(r#"{"ok":true}"#);
        });

        let mut settings = Settings::for_tests(&news.base_url(), &telegram.base_url());
        settings.dry_run = true;
        let summary = run(Client::new(), &settings).await.unwrap();

        assert_eq!(summary.published, 2);
        assert!(summary.dry_run);
        send_mock.assert_calls(0);
    }
}
