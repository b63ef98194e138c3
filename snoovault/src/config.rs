//! Crawl configuration.
//!
//! Everything the engine needs is passed in explicitly at construction; there
//! are no process-wide singletons. [`CrawlConfig::from_env`] resolves defaults
//! from the environment (`.env` supported via dotenvy) exactly once, and the
//! `with_*` builders override individual fields afterwards, so multiple
//! subreddits can run in one process with isolated configuration.

use std::time::Duration;

/// Configuration for one subreddit's crawl loop.
#[derive(Clone, Debug)]
pub struct CrawlConfig {
    /// Subreddit to ingest (the `source_id`).
    pub subreddit: String,
    /// SQLite database URL, e.g. `sqlite://snoovault.db`.
    pub database_url: String,
    /// Maximum items requested per listing call.
    pub page_limit: u32,
    /// Wait after an empty page before re-attempting the same cursor.
    pub idle_backoff: Duration,
    /// Wait after a failed fetch before re-attempting the same cursor.
    pub error_backoff: Duration,
    /// User agent sent with every listing request.
    pub user_agent: String,
    /// Listing endpoint base URL. Injectable for tests.
    pub base_url: String,
}

impl CrawlConfig {
    pub const DEFAULT_PAGE_LIMIT: u32 = 100;
    pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_secs(300);
    pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(120);
    pub const DEFAULT_BASE_URL: &'static str = "https://www.reddit.com";

    /// Build a config from the environment.
    ///
    /// Recognized variables: `SNOOVAULT_SUBREDDIT`, `SNOOVAULT_DB`,
    /// `SNOOVAULT_USER_AGENT`. Missing variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            subreddit: std::env::var("SNOOVAULT_SUBREDDIT")
                .unwrap_or_else(|_| "AskReddit".to_string()),
            database_url: std::env::var("SNOOVAULT_DB")
                .unwrap_or_else(|_| "sqlite://snoovault.db".to_string()),
            page_limit: Self::DEFAULT_PAGE_LIMIT,
            idle_backoff: Self::DEFAULT_IDLE_BACKOFF,
            error_backoff: Self::DEFAULT_ERROR_BACKOFF,
            user_agent: std::env::var("SNOOVAULT_USER_AGENT").unwrap_or_else(|_| {
                format!("snoovault/{}", env!("CARGO_PKG_VERSION"))
            }),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_subreddit(mut self, subreddit: impl Into<String>) -> Self {
        self.subreddit = subreddit.into();
        self
    }

    #[must_use]
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    #[must_use]
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    #[must_use]
    pub fn with_idle_backoff(mut self, idle_backoff: Duration) -> Self {
        self.idle_backoff = idle_backoff;
        self
    }

    #[must_use]
    pub fn with_error_backoff(mut self, error_backoff: Duration) -> Self {
        self.error_backoff = error_backoff;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
