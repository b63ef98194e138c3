//! Batch embedding generation for stored posts.

use rig::embeddings::embedding::EmbeddingModel;
use tracing::info;

use crate::errors::SemSearchError;
use crate::store::EmbeddingStore;
use crate::vector::narrow_to_f32;

/// Summary of one embedding pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmbedReport {
    pub embedded: u64,
    pub batches: u64,
}

/// Generate vectors for every post that does not have one yet.
///
/// Runs in batches (capped by the model's own document limit) until no
/// pending posts remain. Re-running is cheap: posts with stored vectors are
/// never re-embedded.
pub async fn embed_pending<E>(
    model: &E,
    store: &EmbeddingStore,
    batch_size: usize,
) -> Result<EmbedReport, SemSearchError>
where
    E: EmbeddingModel,
{
    store.ensure_schema().await?;
    let batch_size = batch_size.clamp(1, E::MAX_DOCUMENTS);

    let mut report = EmbedReport::default();
    loop {
        let pending = store.pending_posts(batch_size as u32).await?;
        if pending.is_empty() {
            break;
        }

        let texts: Vec<String> = pending.iter().map(|(_, title)| title.clone()).collect();
        let embeddings = model.embed_texts(texts).await?;
        if embeddings.len() != pending.len() {
            return Err(SemSearchError::BatchMismatch {
                expected: pending.len(),
                got: embeddings.len(),
            });
        }

        let rows: Vec<(String, Vec<f32>)> = pending
            .iter()
            .zip(embeddings)
            .map(|((id, _), embedding)| (id.clone(), narrow_to_f32(&embedding.vec)))
            .collect();
        store.save_embeddings(&rows).await?;

        report.embedded += rows.len() as u64;
        report.batches += 1;
        info!(
            batch = report.batches,
            embedded = report.embedded,
            "embedded batch"
        );
    }

    Ok(report)
}
