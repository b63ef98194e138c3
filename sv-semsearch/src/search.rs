//! Brute-force cosine search over all stored vectors.
//!
//! Loads every `(id, vector)` pair and scans linearly. This is deliberate:
//! at the archive's scale a scan is fast enough, and an index is out of
//! scope. Hits whose post row has since disappeared are dropped.

use rig::embeddings::embedding::EmbeddingModel;
use tracing::debug;

use crate::errors::SemSearchError;
use crate::store::EmbeddingStore;
use crate::vector::{cosine_similarity, narrow_to_f32};

/// One ranked search result.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub score: f32,
}

/// Embed `query` and return the `top_n` most similar stored posts.
pub async fn search_similar<E>(
    model: &E,
    store: &EmbeddingStore,
    query: &str,
    top_n: usize,
) -> Result<Vec<SearchHit>, SemSearchError>
where
    E: EmbeddingModel,
{
    let mut embeddings = model.embed_texts(vec![query.to_string()]).await?;
    if embeddings.is_empty() {
        return Err(SemSearchError::BatchMismatch {
            expected: 1,
            got: 0,
        });
    }
    let query_vector = narrow_to_f32(&embeddings.remove(0).vec);

    let stored = store.load_all().await?;
    debug!(candidates = stored.len(), "scanning stored vectors");

    let mut scored: Vec<(String, f32)> = stored
        .into_iter()
        .map(|(id, vector)| {
            let score = cosine_similarity(&query_vector, &vector);
            (id, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_n);

    let mut hits = Vec::with_capacity(scored.len());
    for (id, score) in scored {
        if let Some(title) = store.title_for(&id).await? {
            hits.push(SearchHit { id, title, score });
        }
    }
    Ok(hits)
}
