//! Article retrieval and main-text extraction.

pub mod heuristic;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use heuristic::extract_main_text;

/// Errors raised while turning an article URL into plain text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Article URL could not be parsed.
    #[error("invalid article URL {0}")]
    InvalidUrl(String),
    /// Download failed before a usable response arrived (including timeouts).
    #[error("failed to fetch article: {0}")]
    Transport(#[from] reqwest::Error),
    /// Article host answered with a non-success status.
    #[error("article host returned {0}")]
    Status(StatusCode),
    /// Article is not a text document (PDF, image, archive, ...).
    #[error("unsupported content type `{0}`")]
    UnsupportedContent(String),
    /// The heuristic found no usable text on the page.
    #[error("no article text could be extracted")]
    Content,
    /// The heuristic aborted unexpectedly.
    #[error("extraction aborted: {0}")]
    Fault(String),
}

/// Downloads article pages and recovers their main body text.
pub struct ArticleExtractor {
    http: Client,
    timeout: Duration,
}

impl ArticleExtractor {
    /// Build an extractor sharing the caller's HTTP session.
    pub fn new(http: Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Download `url` and return its main text; empty text is reported as [`ExtractError::Content`].
    pub async fn extract(&self, url: &str) -> Result<String, ExtractError> {
        let page_url =
            Url::parse(url).map_err(|error| ExtractError::InvalidUrl(format!("{url}: {error}")))?;
        let page = self.fetch_page(url).await?;
        tracing::debug!(url, bytes = page.len(), "Fetched article page");

        // Parsing is CPU-bound and the DOM is not `Send`, so it runs on the blocking pool.
        let extracted = tokio::task::spawn_blocking(move || extract_main_text(&page, &page_url))
            .await
            .map_err(|error| ExtractError::Fault(error.to_string()))?;

        extracted.ok_or(ExtractError::Content)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.http.get(url).timeout(self.timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        if let Some(content_type) = content_type.filter(|value| !is_textual(value)) {
            return Err(ExtractError::UnsupportedContent(content_type.to_string()));
        }

        Ok(response.text().await?)
    }
}

/// Whether a `Content-Type` value names a document the heuristic can read.
fn is_textual(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("text/") || essence == "application/xhtml+xml"
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    fn extractor(timeout: Duration) -> ArticleExtractor {
        ArticleExtractor::new(Client::new(), timeout)
    }

    #[test]
    fn textual_content_types() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("TEXT/PLAIN"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(!is_textual("application/pdf"));
        assert!(!is_textual("image/png"));
        assert!(!is_textual("application/octet-stream"));
    }

    #[tokio::test]
    async fn extracts_text_from_served_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/post");
                then.status(200)
                    .header("content-type", "text/html")
                    .body("<html><body><article><p>Hello article.</p></article></body></html>");
            })
            .await;

        let text = extractor(Duration::from_secs(2))
            .extract(&server.url("/post"))
            .await
            .expect("text");
        assert_eq!(text, "Hello article.");
    }

    #[tokio::test]
    async fn pdf_documents_are_unsupported() {
        let server = MockServer::start_async().await;
        let mut body = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj << /Type /Catalog >>\nstream\n".to_vec();
        body.extend_from_slice(&[0x78, 0x9c, 0x00, 0xff, 0xfe]);
        body.extend_from_slice(b"\nendstream\n%%EOF");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/paper.pdf");
                then.status(200)
                    .header("content-type", "application/pdf")
                    .body(body);
            })
            .await;

        let error = extractor(Duration::from_secs(2))
            .extract(&server.url("/paper.pdf"))
            .await
            .unwrap_err();
        assert!(
            matches!(&error, ExtractError::UnsupportedContent(kind) if kind == "application/pdf"),
            "{error:?}"
        );
    }

    #[tokio::test]
    async fn unlabelled_binary_body_is_a_content_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/blob");
                then.status(200).body(vec![0x50, 0x4b, 0x03, 0x04, 0x00, 0xff, 0xfe, 0x10]);
            })
            .await;

        let error = extractor(Duration::from_secs(2))
            .extract(&server.url("/blob"))
            .await
            .unwrap_err();
        assert!(matches!(error, ExtractError::Content), "{error:?}");
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_fetching() {
        let error = extractor(Duration::from_secs(2))
            .extract("not a url")
            .await
            .unwrap_err();
        assert!(matches!(error, ExtractError::InvalidUrl(_)), "{error:?}");
    }

    #[tokio::test]
    async fn error_status_is_not_extracted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404).body("<html><body><p>Not found</p></body></html>");
            })
            .await;

        let error = extractor(Duration::from_secs(2))
            .extract(&server.url("/gone"))
            .await
            .unwrap_err();
        assert!(matches!(error, ExtractError::Status(status) if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn empty_page_is_a_content_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/blank");
                then.status(200).body("<html><body><nav>Menu</nav></body></html>");
            })
            .await;

        let error = extractor(Duration::from_secs(2))
            .extract(&server.url("/blank"))
            .await
            .unwrap_err();
        assert!(matches!(error, ExtractError::Content), "{error:?}");
    }

    #[tokio::test]
    async fn slow_page_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .body("<p>late</p>");
            })
            .await;

        let error = extractor(Duration::from_millis(200))
            .extract(&server.url("/slow"))
            .await
            .unwrap_err();
        assert!(
            matches!(&error, ExtractError::Transport(inner) if inner.is_timeout()),
            "{error:?}"
        );
    }
}
