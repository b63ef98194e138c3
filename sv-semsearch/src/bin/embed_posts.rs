//! Batch job: generate embeddings for archived posts that lack them.
//!
//! Reads the database snoovault writes, embeds pending titles with the
//! OpenAI provider (API key from the environment), and exits when nothing
//! is pending.

use rig::client::{EmbeddingsClient, ProviderClient};
use rig::providers::openai;
use snoovault::CrawlConfig;
use sv_semsearch::{EmbeddingStore, embed_pending};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BATCH_SIZE: usize = 64;

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CrawlConfig::from_env();
    let posts = snoovault::PostStore::connect(&config.database_url).await?;
    let store = EmbeddingStore::for_posts(&posts);

    let model = openai::Client::from_env().embedding_model(openai::TEXT_EMBEDDING_3_SMALL);
    let report = embed_pending(&model, &store, BATCH_SIZE).await?;

    info!(
        embedded = report.embedded,
        batches = report.batches,
        total = store.count().await?,
        "embedding pass complete"
    );
    Ok(())
}
