//! HTTP client wrapper for the Hacker News item API.

use crate::feed::types::{FeedError, ItemDetails, ItemId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const NEWEST_STORIES_PATH: &str = "newstories.json";

/// Reads the newest-stories index and individual item records.
pub struct FeedClient {
    http: Client,
    base_url: String,
    index_timeout: Duration,
    item_timeout: Duration,
}

impl FeedClient {
    /// Build a client sharing the caller's HTTP session.
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        index_timeout: Duration,
        item_timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            index_timeout,
            item_timeout,
        }
    }

    /// Fetch the newest item identifiers, newest first, truncated to `limit`.
    pub async fn fetch_newest_ids(&self, limit: usize) -> Result<Vec<ItemId>, FeedError> {
        let url = format_endpoint(&self.base_url, NEWEST_STORIES_PATH);
        let mut ids: Vec<ItemId> = self.get_json(&url, self.index_timeout).await?;
        ids.truncate(limit);
        tracing::debug!(count = ids.len(), limit, "Fetched newest item ids");
        Ok(ids)
    }

    /// Fetch the metadata record for a single item.
    pub async fn fetch_item(&self, id: ItemId) -> Result<ItemDetails, FeedError> {
        let url = format_endpoint(&self.base_url, &format!("item/{id}.json"));
        let details: Option<ItemDetails> = self.get_json(&url, self.item_timeout).await?;
        details.ok_or(FeedError::MissingItem(id))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, FeedError> {
        let response = self.http.get(url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|error| FeedError::Parse {
            url: url.to_string(),
            message: error.to_string(),
        })
    }
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
