//! # Snoovault: continuous, resumable subreddit ingestion
//!
//! Snoovault pulls paginated submissions from a rate-limited upstream
//! listing, deduplicates and persists them in SQLite, and tracks a durable
//! cursor so the crawl can stop and restart without loss or duplication.
//!
//! ## Components
//!
//! - [`source::PageSource`]: the upstream pagination capability: one call,
//!   one page, items strictly older than the given opaque cursor.
//! - [`writer::BatchWriter`]: applies a page and its checkpoint advance in a
//!   single transaction, idempotent under replay.
//! - [`crawler::Crawler`]: the state machine driving fetch → persist →
//!   checkpoint cycles with idle and error backoff and cooperative
//!   cancellation.
//! - [`store::PostStore`]: the SQLite pool, embedded migrations, and reads.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snoovault::{CrawlConfig, Crawler, PostStore, RedditSource, TokioClock, shutdown_channel};
//!
//! # async fn example() -> miette::Result<()> {
//! let config = CrawlConfig::from_env();
//! let store = PostStore::connect(&config.database_url).await?;
//! let source = Arc::new(RedditSource::new(
//!     &config.user_agent,
//!     config.base_url.clone(),
//!     config.page_limit,
//! )?);
//!
//! let (_shutdown, cancel) = shutdown_channel();
//! let mut crawler = Crawler::new(config, source, store, Arc::new(TokioClock));
//! crawler.run(cancel).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - **Idempotent ingestion**: re-applying a page changes nothing; post rows
//!   are first-write-wins and never updated.
//! - **Checkpoint consistency**: the cursor and frontier timestamp advance
//!   together, atomically, only after the page's posts are durable. A crash
//!   costs at most one page of redundant upstream re-fetch.
//! - **Run-forever failure policy**: fetch failures and empty pages become
//!   backoff states with the cursor unchanged; only storage failure (or an
//!   operator interrupt) stops the loop.

pub mod clock;
pub mod config;
pub mod crawler;
pub mod errors;
pub mod model;
pub mod source;
pub mod store;
pub mod writer;

pub use clock::{Clock, TokioClock};
pub use config::CrawlConfig;
pub use crawler::{CancelSignal, Crawler, StepAction, StepReport, shutdown_channel};
pub use errors::{CrawlError, FetchError, StoreError};
pub use model::{Checkpoint, Cursor, Page, Post};
pub use source::{PageSource, RedditSource};
pub use store::PostStore;
pub use writer::{Advance, BatchWriter};
