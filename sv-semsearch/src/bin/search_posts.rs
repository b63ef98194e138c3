//! Query tool: print the stored posts most similar to a free-text question.

use rig::client::{EmbeddingsClient, ProviderClient};
use rig::providers::openai;
use snoovault::CrawlConfig;
use sv_semsearch::{EmbeddingStore, search_similar};
use tracing_subscriber::EnvFilter;

const TOP_N: usize = 10;

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let query = if args.is_empty() {
        "What makes you lose all hope in the world?".to_string()
    } else {
        args.join(" ")
    };

    let config = CrawlConfig::from_env();
    let posts = snoovault::PostStore::connect(&config.database_url).await?;
    let store = EmbeddingStore::for_posts(&posts);

    let model = openai::Client::from_env().embedding_model(openai::TEXT_EMBEDDING_3_SMALL);
    let hits = search_similar(&model, &store, &query, TOP_N).await?;

    if hits.is_empty() {
        println!("no embedded posts to search; run embed-posts first");
        return Ok(());
    }

    println!("top matches for: {query}");
    for (rank, hit) in hits.iter().enumerate() {
        println!("{:>2}. {} ({}, score {:.3})", rank + 1, hit.title, hit.id, hit.score);
    }
    Ok(())
}
