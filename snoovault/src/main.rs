//! Long-running crawl process.
//!
//! Starts one ingestion loop for the configured subreddit and runs until
//! interrupted. Ctrl-C requests cooperative shutdown: the loop finishes the
//! in-flight page (if any) so the persisted checkpoint stays consistent,
//! then exits.

use std::sync::Arc;

use snoovault::{CrawlConfig, Crawler, PostStore, RedditSource, TokioClock, shutdown_channel};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CrawlConfig::from_env();
    info!(
        subreddit = %config.subreddit,
        database = %config.database_url,
        "starting crawl"
    );

    let store = PostStore::connect(&config.database_url).await?;
    let source = Arc::new(RedditSource::new(
        &config.user_agent,
        config.base_url.clone(),
        config.page_limit,
    )?);

    let (shutdown, cancel) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received; finishing the current page before exit"),
            Err(err) => warn!(error = %err, "interrupt handler failed; shutting down"),
        }
        let _ = shutdown.send(true);
    });

    let mut crawler = Crawler::new(config, source, store, Arc::new(TokioClock));
    crawler.run(cancel).await?;
    Ok(())
}
