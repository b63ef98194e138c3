//! Error taxonomy for the ingestion engine.
//!
//! Three failure domains, with different recovery policies:
//!
//! - [`FetchError`]: the upstream call failed. Recovered locally by the
//!   crawler via error backoff and retried indefinitely; never fatal.
//! - [`StoreError`]: the storage engine rejected a read or write. Fatal to
//!   the crawl loop: the checkpoint must never advance past a write the
//!   store did not confirm.
//! - [`CrawlError`]: what escapes [`crate::crawler::Crawler::run`]. Today
//!   that is storage failure only; exhaustion and fetch failures stay inside
//!   the loop as backoff states.

use miette::Diagnostic;
use thiserror::Error;

/// A failed attempt to fetch a page from the upstream listing.
///
/// Raised only for failed attempts; an empty listing is a normal result,
/// not an error.
#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    #[diagnostic(
        code(snoovault::fetch::transport),
        help("Check network connectivity and the configured listing base URL.")
    )]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    #[diagnostic(
        code(snoovault::fetch::status),
        help("429 means the listing endpoint is throttling; the crawler backs off and retries.")
    )]
    Status { status: reqwest::StatusCode },

    #[error("listing payload could not be decoded: {0}")]
    #[diagnostic(code(snoovault::fetch::decode))]
    Decode(#[source] reqwest::Error),
}

/// Storage engine failure.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    #[diagnostic(
        code(snoovault::store::sqlx),
        help("Ensure the SQLite database URL is valid and the volume is writable.")
    )]
    Sqlx(#[from] sqlx::Error),

    #[error("migration failure: {0}")]
    #[diagnostic(
        code(snoovault::store::migrate),
        help("The embedded migrations must apply cleanly before ingestion starts.")
    )]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("refusing to checkpoint an empty page for r/{subreddit}")]
    #[diagnostic(code(snoovault::store::empty_page))]
    EmptyPage { subreddit: String },
}

/// Failure that terminates one subreddit's crawl loop.
#[derive(Debug, Error, Diagnostic)]
pub enum CrawlError {
    #[error("storage failure during ingestion: {0}")]
    #[diagnostic(code(snoovault::crawl::store))]
    Store(#[from] StoreError),
}
