//! Shared types used by the feed client.

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Opaque identifier of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured metadata for a single feed entry, as returned by the item endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemDetails {
    /// Identifier of the item.
    pub id: ItemId,
    /// Item kind (`story`, `job`, `poll`, `comment`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Headline, when the item has one.
    #[serde(default)]
    pub title: Option<String>,
    /// External document the item links to.
    #[serde(default)]
    pub url: Option<String>,
    /// Vote score.
    #[serde(default, deserialize_with = "zero_when_null")]
    pub score: i64,
    /// Total comment count.
    #[serde(rename = "descendants", default, deserialize_with = "zero_when_null")]
    pub comment_count: i64,
    /// Username of the submitter.
    #[serde(rename = "by", default)]
    pub author: Option<String>,
    /// Submission time, stored by the feed as epoch seconds.
    #[serde(rename = "time", default, with = "time::serde::timestamp::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl ItemDetails {
    /// Whether the item is a story rather than a job, poll, or comment.
    pub fn is_story(&self) -> bool {
        self.kind == "story"
    }

    /// Linked URL, ignoring blank values.
    pub fn external_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Submission time rendered as an RFC 3339 UTC timestamp.
    pub fn timestamp_rfc3339(&self) -> Option<String> {
        self.timestamp
            .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
    }
}

/// Counters may be absent or explicitly `null`; both read as zero.
fn zero_when_null<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Errors returned while talking to the feed API.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP layer failed before a usable response arrived (including timeouts).
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Feed responded with a non-success status code.
    #[error("feed returned {status} for {url}")]
    Status {
        /// HTTP status returned by the feed.
        status: StatusCode,
        /// Requested endpoint.
        url: String,
    },
    /// Response body did not match the expected shape.
    #[error("malformed feed response from {url}: {message}")]
    Parse {
        /// Requested endpoint.
        url: String,
        /// Decoder diagnostic.
        message: String,
    },
    /// The item endpoint answered `null` for this identifier.
    #[error("item {0} does not exist")]
    MissingItem(ItemId),
}
