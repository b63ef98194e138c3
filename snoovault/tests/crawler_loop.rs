//! State-machine behavior of the ingestion loop: backoff selection, cursor
//! retention, resume, cancellation, and the fatal storage path.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use snoovault::{
    BatchWriter, Clock, CrawlConfig, CrawlError, Crawler, Cursor, FetchError, Page, PageSource,
    StepAction, shutdown_channel,
};
use tokio::sync::watch;

mod common;
use common::*;

/// Replays a fixed script of fetch results, then serves empty pages forever.
/// Records every cursor it was asked for.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Page, FetchError>>>,
    seen_cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Page, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen_cursors: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.seen_cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(
        &self,
        _subreddit: &str,
        cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError> {
        self.seen_cursors
            .lock()
            .unwrap()
            .push(cursor.map(|c| c.as_str().to_string()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::default()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records backoff sleeps without waiting and requests shutdown after a fixed
/// number of them, so `run` terminates deterministically.
struct ManualClock {
    sleeps: Mutex<Vec<Duration>>,
    cancel_after: usize,
    shutdown: watch::Sender<bool>,
}

impl ManualClock {
    fn new(cancel_after: usize, shutdown: watch::Sender<bool>) -> Arc<Self> {
        Arc::new(Self {
            sleeps: Mutex::new(Vec::new()),
            cancel_after,
            shutdown,
        })
    }

    fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, period: Duration) {
        let mut sleeps = self.sleeps.lock().unwrap();
        sleeps.push(period);
        if sleeps.len() >= self.cancel_after {
            let _ = self.shutdown.send(true);
        }
    }
}

fn throttled() -> FetchError {
    FetchError::Status {
        status: reqwest::StatusCode::TOO_MANY_REQUESTS,
    }
}

fn test_config() -> CrawlConfig {
    CrawlConfig::from_env()
        .with_subreddit("AskReddit")
        .with_idle_backoff(Duration::from_secs(5))
        .with_error_backoff(Duration::from_secs(2))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn step_selects_the_right_backoff_and_keeps_the_cursor() {
    let (_dir, store) = temp_store().await;
    let source = ScriptedSource::new(vec![
        Ok(page(vec![post("a", 100), post("b", 90), post("c", 80)])),
        Ok(Page::default()),
        Err(throttled()),
    ]);
    let (shutdown, _cancel) = shutdown_channel();
    let clock = ManualClock::new(usize::MAX, shutdown);
    let mut crawler = Crawler::new(test_config(), source.clone(), store.clone(), clock);

    // Non-empty page: write, advance, no delay before the next fetch.
    let report = crawler.step().await.expect("step 1");
    match report.action {
        StepAction::Advanced(advance) => {
            assert_eq!(advance.inserted, 3);
            assert_eq!(advance.cursor, Cursor::new("c"));
            assert_eq!(advance.frontier, 80);
        }
        other => panic!("expected Advanced, got {other:?}"),
    }
    assert_eq!(crawler.cursor(), Some(&Cursor::new("c")));

    // Empty page: idle backoff, cursor unchanged, checkpoint unchanged.
    let report = crawler.step().await.expect("step 2");
    assert!(matches!(report.action, StepAction::IdleBackoff));
    assert_eq!(crawler.cursor(), Some(&Cursor::new("c")));

    // Fetch failure: error backoff, cursor unchanged, checkpoint unchanged.
    let report = crawler.step().await.expect("step 3");
    assert!(matches!(report.action, StepAction::ErrorBackoff));
    assert_eq!(crawler.cursor(), Some(&Cursor::new("c")));

    let checkpoint = store.load_checkpoint("AskReddit").await.unwrap().unwrap();
    assert_eq!(checkpoint.cursor, Cursor::new("c"));
    assert_eq!(checkpoint.frontier, 80);
    assert_eq!(source.seen(), vec![None, Some("c".into()), Some("c".into())]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fetch_failure_on_first_run_leaves_no_checkpoint() {
    let (_dir, store) = temp_store().await;
    let source = ScriptedSource::new(vec![Err(throttled())]);
    let (shutdown, _cancel) = shutdown_channel();
    let clock = ManualClock::new(usize::MAX, shutdown);
    let mut crawler = Crawler::new(test_config(), source, store.clone(), clock);

    let report = crawler.step().await.expect("step");
    assert!(matches!(report.action, StepAction::ErrorBackoff));
    assert!(store.load_checkpoint("AskReddit").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_writes_eagerly_then_idles_with_the_idle_interval() {
    let (_dir, store) = temp_store().await;
    let source = ScriptedSource::new(vec![Ok(page(vec![
        post("a", 100),
        post("b", 90),
        post("c", 80),
    ]))]);
    let (shutdown, cancel) = shutdown_channel();
    let clock = ManualClock::new(2, shutdown);
    let mut crawler = Crawler::new(test_config(), source.clone(), store.clone(), clock.clone());

    crawler.run(cancel).await.expect("run");

    // One eager write (no sleep), then two idle probes at the same cursor.
    assert_eq!(
        clock.recorded(),
        vec![Duration::from_secs(5), Duration::from_secs(5)]
    );
    assert_eq!(
        source.seen(),
        vec![None, Some("c".into()), Some("c".into())]
    );
    assert_eq!(store.count_posts("AskReddit").await.unwrap(), 3);
    assert_eq!(crawler.pages_written(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_retries_failures_with_the_error_interval() {
    let (_dir, store) = temp_store().await;
    let source = ScriptedSource::new(vec![Err(throttled()), Err(throttled())]);
    let (shutdown, cancel) = shutdown_channel();
    let clock = ManualClock::new(2, shutdown);
    let mut crawler = Crawler::new(test_config(), source.clone(), store.clone(), clock.clone());

    crawler.run(cancel).await.expect("run");

    assert_eq!(
        clock.recorded(),
        vec![Duration::from_secs(2), Duration::from_secs(2)]
    );
    assert_eq!(source.seen(), vec![None, None]);
    assert!(store.load_checkpoint("AskReddit").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn resume_hands_the_stored_cursor_to_the_source() {
    let (_dir, store) = temp_store().await;

    // A previous run reached cursor "c".
    BatchWriter::new(store.clone())
        .apply(
            "AskReddit",
            &page(vec![post("a", 100), post("b", 90), post("c", 80)]),
        )
        .await
        .expect("seed checkpoint");

    let source = ScriptedSource::new(vec![]);
    let (shutdown, cancel) = shutdown_channel();
    let clock = ManualClock::new(1, shutdown);
    let mut crawler = Crawler::new(test_config(), source.clone(), store.clone(), clock);

    crawler.run(cancel).await.expect("run");

    assert_eq!(source.seen().first(), Some(&Some("c".to_string())));
    let checkpoint = store.load_checkpoint("AskReddit").await.unwrap().unwrap();
    assert_eq!(checkpoint.cursor, Cursor::new("c"));
    assert_eq!(checkpoint.frontier, 80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fresh_source_resumes_from_the_newest_edge() {
    let (_dir, store) = temp_store().await;
    let source = ScriptedSource::new(vec![]);
    let (shutdown, _cancel) = shutdown_channel();
    let clock = ManualClock::new(usize::MAX, shutdown);
    let mut crawler = Crawler::new(test_config(), source.clone(), store, clock);

    let resumed = crawler.resume().await.expect("resume");
    assert!(resumed.is_none());
    assert!(crawler.cursor().is_none());

    crawler.step().await.expect("step");
    assert_eq!(source.seen(), vec![None]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_before_start_skips_fetching_entirely() {
    let (_dir, store) = temp_store().await;
    let source = ScriptedSource::new(vec![]);
    let (shutdown, cancel) = shutdown_channel();
    // The clock gets its own channel; this test cancels up front instead.
    let (unused_tx, _unused_rx) = shutdown_channel();
    let clock = ManualClock::new(usize::MAX, unused_tx);
    let mut crawler = Crawler::new(test_config(), source.clone(), store, clock);

    shutdown.send(true).expect("send cancel");
    crawler.run(cancel).await.expect("run");

    assert!(source.seen().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn storage_failure_is_fatal_and_rolls_back_the_page() {
    let (_dir, store) = temp_store().await;
    sqlx::query("DROP TABLE progress")
        .execute(store.pool())
        .await
        .expect("drop progress");

    let source = ScriptedSource::new(vec![Ok(page(vec![post("a", 100)]))]);
    let (shutdown, _cancel) = shutdown_channel();
    let clock = ManualClock::new(usize::MAX, shutdown);
    let mut crawler = Crawler::new(test_config(), source, store.clone(), clock);

    let result = crawler.step().await;
    assert!(matches!(result, Err(CrawlError::Store(_))));
    // The transaction covered both phases, so the posts rolled back too.
    assert_eq!(store.count_posts("AskReddit").await.unwrap(), 0);
}
