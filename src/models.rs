//! Data models for the NewsAPI top-headlines payload.
//!
//! This module defines the structures the fetcher deserializes into:
//! - [`NewsResponse`]: The top-level envelope returned by `/v2/top-headlines`
//! - [`Article`]: A single headline with its metadata
//! - [`Source`]: The publisher an article came from
//! - [`Nullable`]: A three-state optional used for fields NewsAPI may omit or null out
//!
//! Field names follow NewsAPI's camelCase schema through `#[serde(rename)]`
//! attributes so the Rust side can stay snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A JSON field that can be missing, explicitly `null`, or carry a value.
///
/// `Option<T>` collapses the first two cases. NewsAPI sends both shapes
/// (`"description": null` vs. no `description` key at all), and a present
/// empty string is different again, so all three are kept apart.
///
/// Fields of this type must be annotated with `#[serde(default)]` so that a
/// missing key lands on [`Nullable::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    /// The key was not present in the payload.
    Absent,
    /// The key was present with a JSON `null`.
    Null,
    /// The key was present with a value.
    // Only read through the test helpers below.
    #[allow(dead_code)]
    Present(T),
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::Absent
    }
}

#[cfg(test)]
impl<T> Nullable<T> {
    /// Borrow the value if one was sent.
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Nullable::Present(v) => Some(v),
            Nullable::Absent | Nullable::Null => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key exists; absence is handled by `#[serde(default)]`.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Nullable::Present(v),
            None => Nullable::Null,
        })
    }
}

/// The envelope returned by the top-headlines endpoint.
///
/// Every field defaults when missing. A response without an `articles` key
/// therefore yields an empty article list instead of a decode error, which
/// is also what happens with NewsAPI's error payload
/// (`{"status":"error","code":"...","message":"..."}`).
#[derive(Debug, Deserialize)]
pub struct NewsResponse {
    /// `"ok"` or `"error"`.
    #[serde(default)]
    pub status: String,
    /// Total number of results the API reports for the query.
    #[serde(default, rename = "totalResults")]
    pub total_results: u64,
    /// Headlines in the order the API returned them.
    #[serde(default)]
    pub articles: Vec<Article>,
    /// Machine-readable error code, only sent with `status: "error"`.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable error message, only sent with `status: "error"`.
    #[serde(default)]
    pub message: Option<String>,
}

impl NewsResponse {
    /// Whether the API reported an application-level error.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// Deserialize a missing or `null` value as `T::default()`.
///
/// Pair with `#[serde(default)]` so the missing-key case is covered too.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single headline.
///
/// Only [`Article::title`] and [`Article::url`] are consumed downstream.
/// Both decode to `""` when missing or `null` so that one bad item does not
/// fail the whole batch; the relay skips such articles instead.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: Source,
    #[allow(dead_code)]
    #[serde(default)]
    pub author: Nullable<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub description: Nullable<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[allow(dead_code)]
    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Nullable<String>,
    /// RFC 3339 timestamp as sent by the API, e.g. `2023-01-01T00:00:00Z`.
    #[serde(default, rename = "publishedAt", deserialize_with = "null_as_default")]
    pub published_at: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub content: Nullable<String>,
}

impl Article {
    /// Whether the article carries both a title and a URL to link to.
    pub fn is_publishable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }

    /// Parse the `publishedAt` field into a UTC timestamp.
    ///
    /// Returns `None` when the field is empty or not valid RFC 3339.
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The publisher an article is attributed to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    /// Stable identifier such as `google-news`. NewsAPI sends `null` for
    /// sources it has no identifier for.
    #[allow(dead_code)]
    #[serde(default)]
    pub id: Nullable<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}
