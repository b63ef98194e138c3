//! Core domain types for the ingestion engine.
//!
//! Two concepts do the heavy lifting here:
//!
//! - [`Cursor`]: an opaque pagination token. Only the page source that minted
//!   it may interpret its contents; the crawler and the store treat it as a
//!   black box so the engine stays reusable across pagination schemes.
//! - [`Checkpoint`]: the durable resumption state for one subreddit: the
//!   cursor of the last fully-written page and the oldest creation timestamp
//!   reached so far (the frontier).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque traversal position in the upstream's paginated listing.
///
/// Minted by a [`crate::source::PageSource`] from the trailing item of a page
/// and handed back verbatim on the next fetch. Nothing outside the source
/// implementation inspects its structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Cursor {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// One ingested submission.
///
/// `id` is assigned by the upstream source and globally unique per source.
/// Everything besides `id`, `subreddit`, and `created_utc` is payload the
/// ingestion engine carries but never interprets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub subreddit: String,
    /// Upstream-assigned creation time, integer seconds since the epoch.
    pub created_utc: i64,
    pub num_comments: i64,
    pub score: i64,
    pub upvote_ratio: f64,
    pub title: String,
    pub url: String,
}

impl Post {
    /// Creation time as a UTC datetime, when the timestamp is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc, 0)
    }
}

/// One page of the upstream listing, ordered newest-first.
///
/// `next_cursor` identifies the trailing (oldest) post of the page; `None`
/// together with an empty `posts` means the upstream had nothing older than
/// the requested cursor right now.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub posts: Vec<Post>,
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// The oldest post of the page, the one the checkpoint advances to.
    pub fn trailing(&self) -> Option<&Post> {
        self.posts.last()
    }
}

/// Durable resumption state for one subreddit.
///
/// `cursor` and `frontier` are updated together, atomically, and only after
/// the corresponding posts are durable. `frontier` only moves backward in
/// time across successful writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub subreddit: String,
    pub cursor: Cursor,
    /// Oldest `created_utc` reached so far, seconds since the epoch.
    pub frontier: i64,
}

impl Checkpoint {
    /// Frontier as a UTC datetime, when the timestamp is representable.
    pub fn frontier_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.frontier, 0)
    }
}
