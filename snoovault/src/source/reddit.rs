//! Reddit listing implementation of [`PageSource`].
//!
//! Talks to the public JSON listing endpoint
//! `GET {base}/r/{subreddit}/new.json`, which returns submissions
//! newest-first and accepts an `after` fullname to continue strictly older
//! than a known item. This module is the only place that knows cursors are
//! `t3_`-prefixed fullnames; everywhere else they stay opaque.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::PageSource;
use crate::errors::FetchError;
use crate::model::{Cursor, Page, Post};

/// Fullname prefix for link (submission) objects.
const LINK_KIND_PREFIX: &str = "t3_";

/// Page source backed by Reddit's public listing API.
#[derive(Clone, Debug)]
pub struct RedditSource {
    client: Client,
    base_url: String,
    page_limit: u32,
}

impl RedditSource {
    /// Build a source with its own HTTP client.
    ///
    /// `base_url` is injectable so tests can point at a local mock server.
    pub fn new(
        user_agent: &str,
        base_url: impl Into<String>,
        page_limit: u32,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            page_limit,
        })
    }

    fn listing_url(&self, subreddit: &str, cursor: Option<&Cursor>) -> String {
        let mut url = format!(
            "{}/r/{}/new.json?raw_json=1&limit={}",
            self.base_url.trim_end_matches('/'),
            subreddit,
            self.page_limit,
        );
        if let Some(cursor) = cursor {
            url.push_str("&after=");
            url.push_str(LINK_KIND_PREFIX);
            url.push_str(cursor.as_str());
        }
        url
    }
}

#[async_trait]
impl PageSource for RedditSource {
    #[instrument(skip(self, cursor), err)]
    async fn fetch_page(
        &self,
        subreddit: &str,
        cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError> {
        let url = self.listing_url(subreddit, cursor);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        let listing: Listing = response.json().await.map_err(FetchError::Decode)?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_post())
            .collect();
        let next_cursor = posts.last().map(|post| Cursor::new(post.id.clone()));
        debug!(count = posts.len(), "fetched listing page");
        Ok(Page { posts, next_cursor })
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListedThing>,
}

#[derive(Debug, Deserialize)]
struct ListedThing {
    data: RawSubmission,
}

/// Wire shape of one submission; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: String,
    subreddit: String,
    created_utc: f64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    upvote_ratio: f64,
    title: String,
    #[serde(default)]
    url: String,
}

impl RawSubmission {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            subreddit: self.subreddit,
            // The listing reports fractional seconds; whole seconds is what
            // the frontier tracks.
            created_utc: self.created_utc as i64,
            num_comments: self.num_comments,
            score: self.score,
            upvote_ratio: self.upvote_ratio,
            title: self.title,
            url: self.url,
        }
    }
}
