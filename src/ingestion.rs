//! Concurrent ingestion: newest ids → item metadata → article text → ordered documents.
//!
//! One task is spawned per id and every task runs to completion on its own; a slow or failing
//! item never cancels its siblings. Each task reports back with its position in the index, so
//! the surviving documents are compacted in feed order no matter which task finishes first.

use crate::config::Config;
use crate::extract::{ArticleExtractor, ExtractError};
use crate::feed::{FeedClient, FeedError, ItemDetails, ItemId};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

const USER_AGENT: &str = concat!("hn-summarizer/", env!("CARGO_PKG_VERSION"));

/// Extracted article text plus the metadata of the item that linked it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Main article text; never empty.
    pub content: String,
    /// Metadata copied from the originating item.
    pub meta: DocumentMeta,
}

/// Item metadata attached to a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMeta {
    /// Identifier of the originating item.
    pub id: ItemId,
    /// Story headline.
    pub title: Option<String>,
    /// Linked article URL.
    pub url: String,
    /// Vote score.
    pub score: i64,
    /// Total comment count.
    pub comment_count: i64,
    /// Submitter username.
    pub author: Option<String>,
    /// Submission time as an RFC 3339 UTC timestamp.
    pub time_iso: Option<String>,
}

impl Document {
    /// Combine item metadata with extracted text.
    ///
    /// Returns `None` unless the item is a story with a non-empty URL and `content` holds text.
    pub fn assemble(details: &ItemDetails, content: String) -> Option<Self> {
        if !details.is_story() || content.trim().is_empty() {
            return None;
        }
        let url = details.external_url()?.to_string();
        Some(Self {
            content,
            meta: DocumentMeta {
                id: details.id,
                title: details.title.clone(),
                url,
                score: details.score,
                comment_count: details.comment_count,
                author: details.author.clone(),
                time_iso: details.timestamp_rfc3339(),
            },
        })
    }
}

/// Why an id contributed no document.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// Item metadata could not be fetched or decoded.
    #[error("details unavailable: {0}")]
    DetailsUnavailable(#[from] FeedError),
    /// Item is a job, poll, comment, or other non-story kind.
    #[error("not a story (kind `{0}`)")]
    NotAStory(String),
    /// Story has no external link (Ask HN and other text posts).
    #[error("no external URL")]
    MissingUrl,
    /// Article could not be downloaded or yielded no text.
    #[error("article unextractable: {0}")]
    Unextractable(#[from] ExtractError),
}

/// Read-only settings shared by every ingestion task.
#[derive(Debug, Clone)]
pub struct IngestionSettings {
    /// Base URL of the feed API.
    pub api_base: String,
    /// Timeout for the index request.
    pub index_timeout: Duration,
    /// Timeout for each item request.
    pub item_timeout: Duration,
    /// Timeout for each article download.
    pub article_timeout: Duration,
}

impl IngestionSettings {
    /// Derive ingestion settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_base: config.hn_api_base.clone(),
            index_timeout: config.index_timeout,
            item_timeout: config.item_timeout,
            article_timeout: config.article_timeout,
        }
    }
}

/// Turns the newest `K` feed entries into ordered [`Document`]s.
pub struct IngestionPipeline {
    settings: IngestionSettings,
}

impl IngestionPipeline {
    /// Create a pipeline with the given settings.
    pub fn new(settings: IngestionSettings) -> Self {
        Self { settings }
    }

    /// Fetch, filter, and extract the newest `limit` items.
    ///
    /// Never fails: an index failure yields an empty list and every per-item failure is dropped.
    /// The result preserves the feed order of the surviving items and has at most `limit` entries.
    pub async fn run(&self, limit: usize) -> Vec<Document> {
        if limit == 0 {
            return Vec::new();
        }

        // One session per run; it is dropped with the clients below once all tasks have joined.
        let http = match Client::builder().user_agent(USER_AGENT).build() {
            Ok(http) => http,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to build HTTP client; skipping ingestion");
                return Vec::new();
            }
        };
        let feed = Arc::new(FeedClient::new(
            http.clone(),
            self.settings.api_base.clone(),
            self.settings.index_timeout,
            self.settings.item_timeout,
        ));
        let extractor = Arc::new(ArticleExtractor::new(http, self.settings.article_timeout));

        let ids = match feed.fetch_newest_ids(limit).await {
            Ok(ids) => ids,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to fetch newest story ids");
                return Vec::new();
            }
        };
        if ids.is_empty() {
            return Vec::new();
        }

        let mut tasks = JoinSet::new();
        for (index, id) in ids.iter().copied().enumerate() {
            let feed = Arc::clone(&feed);
            let extractor = Arc::clone(&extractor);
            tasks.spawn(async move { (index, process_item(&feed, &extractor, id).await) });
        }

        let mut slots: Vec<Option<Document>> = vec![None; ids.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(document))) => slots[index] = Some(document),
                Ok((index, Err(reason))) => {
                    tracing::debug!(id = %ids[index], reason = %reason, "Skipped item");
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Ingestion task aborted");
                }
            }
        }

        let documents: Vec<Document> = slots.into_iter().flatten().collect();
        tracing::info!(
            processed = documents.len(),
            requested = limit,
            "Processed {} of {} requested stories",
            documents.len(),
            limit
        );
        documents
    }
}

/// Resolve one id into a document, or the reason it was skipped.
async fn process_item(
    feed: &FeedClient,
    extractor: &ArticleExtractor,
    id: ItemId,
) -> Result<Document, SkipReason> {
    let details = feed.fetch_item(id).await?;
    if !details.is_story() {
        return Err(SkipReason::NotAStory(details.kind));
    }
    let url = details.external_url().ok_or(SkipReason::MissingUrl)?;

    let content = extractor.extract(url).await?;
    Document::assemble(&details, content).ok_or(SkipReason::Unextractable(ExtractError::Content))
}
