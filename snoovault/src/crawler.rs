//! The ingestion loop.
//!
//! An explicit state machine per subreddit:
//!
//! ```text
//! RESUME → FETCHING → (WRITING | IDLE_BACKOFF | ERROR_BACKOFF) → FETCHING → …
//! ```
//!
//! [`Crawler::step`] performs exactly one fetch → (write | idle | error)
//! cycle and reports what happened; [`Crawler::run`] drives steps forever,
//! sleeping through the injectable [`Clock`] after idle and error outcomes
//! and continuing immediately after a successful write. The loop is terminal
//! only on cancellation, which is observed at state boundaries and during
//! backoff sleeps, never mid-write, so the persisted checkpoint always
//! reflects a fully-written page.
//!
//! Backoff policy: both backoffs keep the cursor unchanged and retry
//! indefinitely. "No more old items right now" does not mean "never"; a
//! temporary upstream glitch at the frontier must not silently skip content.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::config::CrawlConfig;
use crate::errors::CrawlError;
use crate::model::{Checkpoint, Cursor};
use crate::source::PageSource;
use crate::store::PostStore;
use crate::writer::{Advance, BatchWriter};

/// Cooperative cancellation signal observed between states.
pub type CancelSignal = watch::Receiver<bool>;

/// Create a shutdown channel; send `true` to stop the loop after the current
/// step completes.
pub fn shutdown_channel() -> (watch::Sender<bool>, CancelSignal) {
    watch::channel(false)
}

/// What a single fetch → persist cycle did.
#[derive(Clone, Debug)]
pub enum StepAction {
    /// A non-empty page was written and the checkpoint advanced; the next
    /// fetch follows immediately.
    Advanced(Advance),
    /// The upstream had nothing older than the cursor; wait out the idle
    /// backoff with the cursor unchanged.
    IdleBackoff,
    /// The fetch failed; wait out the error backoff and retry the same
    /// cursor.
    ErrorBackoff,
}

/// Report for one executed step.
#[derive(Clone, Debug)]
pub struct StepReport {
    /// 1-based step counter for this crawler instance.
    pub step: u64,
    pub action: StepAction,
}

/// The ingestion state machine for one subreddit.
///
/// Owns the decision of when the checkpoint advances; all storage mutation
/// goes through its [`BatchWriter`].
pub struct Crawler {
    config: CrawlConfig,
    source: Arc<dyn PageSource>,
    store: PostStore,
    writer: BatchWriter,
    clock: Arc<dyn Clock>,
    cursor: Option<Cursor>,
    steps: u64,
    pages_written: u64,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        source: Arc<dyn PageSource>,
        store: PostStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let writer = BatchWriter::new(store.clone());
        Self {
            config,
            source,
            store,
            writer,
            clock,
            cursor: None,
            steps: 0,
            pages_written: 0,
        }
    }

    /// Current cursor (`None` before resume or on a fresh source).
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Pages successfully written by this instance.
    pub fn pages_written(&self) -> u64 {
        self.pages_written
    }

    /// Load the durable checkpoint and position the cursor on it.
    ///
    /// An absent checkpoint means "start from the newest edge".
    #[instrument(skip(self), fields(subreddit = %self.config.subreddit), err)]
    pub async fn resume(&mut self) -> Result<Option<Checkpoint>, CrawlError> {
        let checkpoint = self.store.load_checkpoint(&self.config.subreddit).await?;
        self.cursor = checkpoint.as_ref().map(|cp| cp.cursor.clone());
        match &checkpoint {
            Some(cp) => info!(
                cursor = %cp.cursor,
                frontier = %frontier_display(cp.frontier),
                "resuming from checkpoint"
            ),
            None => info!("no checkpoint; starting from the newest edge"),
        }
        Ok(checkpoint)
    }

    /// Execute one fetch → (write | idle | error) cycle without sleeping.
    ///
    /// Fetch failures and exhaustion become backoff actions; storage failure
    /// is fatal and propagates; the loop must never advance a checkpoint it
    /// did not confirm.
    pub async fn step(&mut self) -> Result<StepReport, CrawlError> {
        self.steps += 1;
        let subreddit = self.config.subreddit.clone();

        let fetched = self
            .source
            .fetch_page(&subreddit, self.cursor.as_ref())
            .await;
        let action = match fetched {
            Err(err) => {
                warn!(
                    source = self.source.name(),
                    error = %err,
                    retry_in = ?self.config.error_backoff,
                    "fetch failed; entering error backoff"
                );
                StepAction::ErrorBackoff
            }
            Ok(page) if page.is_empty() => {
                info!(
                    retry_in = ?self.config.idle_backoff,
                    "nothing older than the cursor; entering idle backoff"
                );
                StepAction::IdleBackoff
            }
            Ok(page) => {
                let advance = self.writer.apply(&subreddit, &page).await?;
                self.cursor = Some(advance.cursor.clone());
                self.pages_written += 1;
                info!(
                    pages = self.pages_written,
                    inserted = advance.inserted,
                    skipped = advance.skipped,
                    frontier = %frontier_display(advance.frontier),
                    "page ingested"
                );
                StepAction::Advanced(advance)
            }
        };

        Ok(StepReport {
            step: self.steps,
            action,
        })
    }

    /// Resume, then drive steps until cancelled.
    ///
    /// After a written page the next fetch follows immediately; after idle or
    /// error outcomes the loop sleeps the configured backoff, waking early if
    /// the cancel signal fires. Returns `Ok(())` on cancellation and `Err`
    /// only on storage failure.
    pub async fn run(&mut self, mut cancel: CancelSignal) -> Result<(), CrawlError> {
        self.resume().await?;

        loop {
            if *cancel.borrow() {
                break;
            }

            let report = self.step().await?;
            let backoff = match report.action {
                StepAction::Advanced(_) => None,
                StepAction::IdleBackoff => Some(self.config.idle_backoff),
                StepAction::ErrorBackoff => Some(self.config.error_backoff),
            };

            let Some(period) = backoff else {
                continue;
            };
            tokio::select! {
                _ = self.clock.sleep(period) => {}
                changed = cancel.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(
            pages = self.pages_written,
            "crawl loop stopped; checkpoint reflects the last fully-written page"
        );
        Ok(())
    }
}

fn frontier_display(frontier: i64) -> String {
    chrono::DateTime::from_timestamp(frontier, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| frontier.to_string())
}
