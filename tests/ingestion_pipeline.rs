use std::time::{Duration, Instant};

use hn_summarizer::feed::ItemId;
use hn_summarizer::ingestion::{IngestionPipeline, IngestionSettings};
use httpmock::{Method::GET, MockServer};
use serde_json::{Value, json};

fn pipeline(api_base: String) -> IngestionPipeline {
    IngestionPipeline::new(IngestionSettings {
        api_base,
        index_timeout: Duration::from_secs(2),
        item_timeout: Duration::from_secs(2),
        article_timeout: Duration::from_millis(300),
    })
}

async fn mock_index(server: &MockServer, ids: Value) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/newstories.json");
            then.status(200).json_body(ids);
        })
        .await;
}

async fn mock_item(server: &MockServer, id: u64, body: Value, delay: Duration) {
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/item/{id}.json"));
            then.status(200).delay(delay).json_body(body);
        })
        .await;
}

async fn mock_article(server: &MockServer, path: &str, text: &str, delay: Duration) {
    let html = format!("<html><body><article><p>{text}</p></article></body></html>");
    server
        .mock_async(|when, then| {
            when.method(GET).path(path.to_string());
            then.status(200)
                .header("content-type", "text/html")
                .delay(delay)
                .body(html);
        })
        .await;
}

fn story(server: &MockServer, id: u64, path: &str) -> Value {
    json!({
        "id": id,
        "type": "story",
        "title": format!("Story {id}"),
        "url": server.url(path),
        "score": id * 10,
        "descendants": 3,
        "by": "alice",
        "time": 1_700_000_000
    })
}

#[tokio::test]
async fn keeps_linked_stories_and_drops_text_posts_and_slow_articles() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([101, 102, 103])).await;
    mock_item(&server, 101, story(&server, 101, "/a"), Duration::ZERO).await;
    mock_item(
        &server,
        102,
        json!({ "id": 102, "type": "story", "title": "Ask HN: No link" }),
        Duration::ZERO,
    )
    .await;
    mock_item(&server, 103, story(&server, 103, "/b"), Duration::ZERO).await;
    mock_article(&server, "/a", "Text A", Duration::ZERO).await;
    mock_article(&server, "/b", "Text B", Duration::from_secs(2)).await;

    let documents = pipeline(server.base_url()).run(3).await;

    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert_eq!(document.content, "Text A");
    assert_eq!(document.meta.id, ItemId(101));
    assert_eq!(document.meta.title.as_deref(), Some("Story 101"));
    assert_eq!(document.meta.url, server.url("/a"));
    assert_eq!(document.meta.score, 1010);
    assert_eq!(document.meta.comment_count, 3);
    assert_eq!(document.meta.author.as_deref(), Some("alice"));
    assert_eq!(
        document.meta.time_iso.as_deref(),
        Some("2023-11-14T22:13:20Z")
    );
}

#[tokio::test]
async fn unreachable_index_yields_no_documents() {
    let documents = pipeline("http://127.0.0.1:9".to_string()).run(5).await;
    assert!(documents.is_empty());
}

#[tokio::test]
async fn failing_index_yields_no_documents_and_fetches_no_items() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/newstories.json");
            then.status(500);
        })
        .await;
    let item = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/item/");
            then.status(200).json_body(json!(null));
        })
        .await;

    let documents = pipeline(server.base_url()).run(5).await;

    assert!(documents.is_empty());
    assert_eq!(item.hits_async().await, 0);
}

#[tokio::test]
async fn jobs_are_excluded_even_with_a_url() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([201])).await;
    mock_item(
        &server,
        201,
        json!({ "id": 201, "type": "job", "title": "Hiring", "url": server.url("/job") }),
        Duration::ZERO,
    )
    .await;
    let article = server
        .mock_async(|when, then| {
            when.method(GET).path("/job");
            then.status(200).body("<p>Apply now</p>");
        })
        .await;

    let documents = pipeline(server.base_url()).run(1).await;

    assert!(documents.is_empty());
    assert_eq!(article.hits_async().await, 0);
}

#[tokio::test]
async fn output_follows_index_order_not_completion_order() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([1, 2, 3])).await;
    mock_item(&server, 1, story(&server, 1, "/one"), Duration::from_millis(250)).await;
    mock_item(&server, 2, story(&server, 2, "/two"), Duration::ZERO).await;
    mock_item(&server, 3, story(&server, 3, "/three"), Duration::from_millis(100)).await;
    mock_article(&server, "/one", "First", Duration::ZERO).await;
    mock_article(&server, "/two", "Second", Duration::ZERO).await;
    mock_article(&server, "/three", "Third", Duration::ZERO).await;

    let documents = pipeline(server.base_url()).run(3).await;

    let ids: Vec<ItemId> = documents.iter().map(|doc| doc.meta.id).collect();
    assert_eq!(ids, vec![ItemId(1), ItemId(2), ItemId(3)]);
    let contents: Vec<&str> = documents.iter().map(|doc| doc.content.as_str()).collect();
    assert_eq!(contents, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn items_are_fetched_concurrently() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([11, 12, 13, 14])).await;
    for id in 11..=14 {
        let path = format!("/p{id}");
        mock_item(&server, id, story(&server, id, &path), Duration::from_millis(400)).await;
        mock_article(&server, &path, "Body", Duration::ZERO).await;
    }

    let started = Instant::now();
    let documents = pipeline(server.base_url()).run(4).await;

    assert_eq!(documents.len(), 4);
    assert!(
        started.elapsed() < Duration::from_millis(1500),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn never_returns_more_than_requested() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([1, 2, 3, 4, 5, 6])).await;
    for id in 1..=2 {
        let path = format!("/s{id}");
        mock_item(&server, id, story(&server, id, &path), Duration::ZERO).await;
        mock_article(&server, &path, "Body", Duration::ZERO).await;
    }
    let beyond_limit = server
        .mock_async(|when, then| {
            when.method(GET).path("/item/3.json");
            then.status(200).json_body(json!({ "id": 3, "type": "story" }));
        })
        .await;

    let documents = pipeline(server.base_url()).run(2).await;

    assert_eq!(documents.len(), 2);
    assert_eq!(beyond_limit.hits_async().await, 0);
}

#[tokio::test]
async fn deleted_items_and_empty_articles_are_skipped() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([31, 32, 33])).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/item/31.json");
            then.status(200).body("null");
        })
        .await;
    mock_item(&server, 32, story(&server, 32, "/empty"), Duration::ZERO).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/empty");
            then.status(200)
                .body("<html><body><nav>Menu</nav><footer>Footer</footer></body></html>");
        })
        .await;
    mock_item(&server, 33, story(&server, 33, "/ok"), Duration::ZERO).await;
    mock_article(&server, "/ok", "Kept", Duration::ZERO).await;

    let documents = pipeline(server.base_url()).run(3).await;

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].meta.id, ItemId(33));
    assert_eq!(documents[0].content, "Kept");
}

#[tokio::test]
async fn linked_pdfs_never_become_documents() {
    let server = MockServer::start_async().await;
    mock_index(&server, json!([41, 42])).await;
    mock_item(&server, 41, story(&server, 41, "/paper.pdf"), Duration::ZERO).await;
    let mut pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj << /Type /Catalog >>\nstream\n".to_vec();
    pdf.extend_from_slice(&[0x78, 0x9c, 0x00, 0xff, 0xfe]);
    pdf.extend_from_slice(b"\nendstream\n%%EOF");
    server
        .mock_async(|when, then| {
            when.method(GET).path("/paper.pdf");
            then.status(200)
                .header("content-type", "application/pdf")
                .body(pdf);
        })
        .await;
    mock_item(&server, 42, story(&server, 42, "/html"), Duration::ZERO).await;
    mock_article(&server, "/html", "Readable", Duration::ZERO).await;

    let documents = pipeline(server.base_url()).run(2).await;

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].meta.id, ItemId(42));
    assert_eq!(documents[0].content, "Readable");
}
