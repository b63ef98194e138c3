#![allow(dead_code)]

use snoovault::{Cursor, Page, Post, PostStore};
use tempfile::TempDir;

/// File-backed store in a temp directory, so reconnects observe durable state.
pub async fn temp_store() -> (TempDir, PostStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let store = PostStore::connect(&url).await.expect("connect store");
    (dir, store)
}

pub fn post(id: &str, created_utc: i64) -> Post {
    Post {
        id: id.to_string(),
        subreddit: "AskReddit".to_string(),
        created_utc,
        num_comments: 3,
        score: 17,
        upvote_ratio: 0.91,
        title: format!("post {id}"),
        url: format!("https://www.reddit.com/r/AskReddit/comments/{id}/"),
    }
}

/// Page whose next cursor is the trailing post, matching the fetcher contract.
pub fn page(posts: Vec<Post>) -> Page {
    let next_cursor = posts.last().map(|p| Cursor::new(p.id.clone()));
    Page { posts, next_cursor }
}
