//! RedditSource against a mock listing endpoint: parsing, cursor protocol,
//! exhaustion, and the failure taxonomy.

use httpmock::prelude::*;
use snoovault::{Cursor, FetchError, PageSource, RedditSource};

fn listing_body() -> &'static str {
    r#"{
        "kind": "Listing",
        "data": {
            "dist": 2,
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "id": "aaa111",
                        "subreddit": "AskReddit",
                        "created_utc": 1700000200.0,
                        "num_comments": 12,
                        "score": 40,
                        "upvote_ratio": 0.93,
                        "title": "What small habit improved your life?",
                        "url": "https://www.reddit.com/r/AskReddit/comments/aaa111/"
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "id": "bbb222",
                        "subreddit": "AskReddit",
                        "created_utc": 1700000100.0,
                        "num_comments": 4,
                        "score": 7,
                        "upvote_ratio": 0.81,
                        "title": "What's a movie everyone loves but you hate?",
                        "url": "https://www.reddit.com/r/AskReddit/comments/bbb222/"
                    }
                }
            ],
            "after": "t3_bbb222",
            "before": null
        }
    }"#
}

fn empty_listing_body() -> &'static str {
    r#"{"kind": "Listing", "data": {"dist": 0, "children": [], "after": null, "before": null}}"#
}

fn source_for(server: &MockServer, page_limit: u32) -> RedditSource {
    RedditSource::new("snoovault-test", server.base_url(), page_limit).expect("build source")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parses_a_listing_page_newest_first() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/r/AskReddit/new.json")
                .query_param("raw_json", "1")
                .query_param("limit", "2");
            then.status(200)
                .header("content-type", "application/json")
                .body(listing_body());
        })
        .await;

    let page = source_for(&server, 2)
        .fetch_page("AskReddit", None)
        .await
        .expect("fetch page");
    mock.assert_async().await;

    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id, "aaa111");
    assert_eq!(page.posts[0].created_utc, 1700000200);
    assert_eq!(page.posts[0].num_comments, 12);
    assert_eq!(page.posts[1].id, "bbb222");
    assert_eq!(page.posts[1].title, "What's a movie everyone loves but you hate?");
    // The cursor is the trailing (oldest) post of the page.
    assert_eq!(page.next_cursor, Some(Cursor::new("bbb222")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cursor_is_sent_as_a_link_fullname() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/r/AskReddit/new.json")
                .query_param("after", "t3_bbb222");
            then.status(200)
                .header("content-type", "application/json")
                .body(empty_listing_body());
        })
        .await;

    let cursor = Cursor::new("bbb222");
    let page = source_for(&server, 100)
        .fetch_page("AskReddit", Some(&cursor))
        .await
        .expect("fetch page");
    mock.assert_async().await;

    assert!(page.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_listing_is_exhaustion_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r/AskReddit/new.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(empty_listing_body());
        })
        .await;

    let page = source_for(&server, 100)
        .fetch_page("AskReddit", None)
        .await
        .expect("exhaustion is Ok");
    assert!(page.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn throttling_becomes_a_status_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r/AskReddit/new.json");
            then.status(429);
        })
        .await;

    let err = source_for(&server, 100)
        .fetch_page("AskReddit", None)
        .await
        .expect_err("throttling must fail the fetch");
    match err {
        FetchError::Status { status } => assert_eq!(status.as_u16(), 429),
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_payload_becomes_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r/AskReddit/new.json");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>rate limited</html>");
        })
        .await;

    let err = source_for(&server, 100)
        .fetch_page("AskReddit", None)
        .await
        .expect_err("html payload must fail to decode");
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_host_becomes_a_transport_error() {
    let source =
        RedditSource::new("snoovault-test", "http://127.0.0.1:9", 100).expect("build source");
    let err = source
        .fetch_page("AskReddit", None)
        .await
        .expect_err("nothing listens on port 9");
    assert!(matches!(err, FetchError::Transport(_)));
}
