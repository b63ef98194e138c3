//! The upstream pagination capability.
//!
//! [`PageSource`] is the seam between the crawl loop and whatever serves the
//! listing. The contract fixes traversal direction (strictly backward in
//! time, newest to oldest) and the cursor protocol: `None` starts at the
//! newest edge, a cursor asks for items strictly older than the item it
//! identifies. One upstream call per invocation; multi-page assembly belongs
//! to the crawl loop.

pub mod reddit;

pub use reddit::RedditSource;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::model::{Cursor, Page};

/// Pagination capability of an upstream content source.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of items strictly older than `cursor`, or the newest
    /// page when `cursor` is `None`.
    ///
    /// An empty page with no cursor means "nothing older right now"; true
    /// exhaustion and the upstream's retrievable-history cap are deliberately
    /// indistinguishable, and neither is an error. `Err` is reserved for
    /// failed attempts: transport, auth, throttling.
    async fn fetch_page(
        &self,
        subreddit: &str,
        cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
