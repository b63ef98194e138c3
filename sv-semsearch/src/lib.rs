//! # sv-semsearch: semantic search over the snoovault archive
//!
//! The embedding collaborator for [`snoovault`]: it reads `(id, title)` rows
//! the crawler has persisted, writes `(id, vector)` rows into its own table
//! in the same database, and answers free-text queries with the top-N posts
//! by cosine similarity.
//!
//! The crate is generic over any [`rig::embeddings::embedding::EmbeddingModel`],
//! so real providers and deterministic test models plug in the same way:
//!
//! ```rust,no_run
//! use snoovault::PostStore;
//! use sv_semsearch::{EmbeddingStore, embed_pending, search_similar};
//! use rig::client::{EmbeddingsClient, ProviderClient};
//! use rig::providers::openai;
//!
//! # async fn example() -> miette::Result<()> {
//! let posts = PostStore::connect("sqlite://snoovault.db").await?;
//! let store = EmbeddingStore::for_posts(&posts);
//! let model = openai::Client::from_env().embedding_model(openai::TEXT_EMBEDDING_3_SMALL);
//!
//! embed_pending(&model, &store, 64).await?;
//! let hits = search_similar(&model, &store, "What makes you lose all hope?", 10).await?;
//! # Ok(())
//! # }
//! ```

pub mod embed;
pub mod errors;
pub mod search;
pub mod store;
pub mod vector;

pub use embed::{EmbedReport, embed_pending};
pub use errors::SemSearchError;
pub use search::{SearchHit, search_similar};
pub use store::EmbeddingStore;
