//! Failure modes of the embedding collaborator.

use miette::Diagnostic;
use rig::embeddings::embedding::EmbeddingError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SemSearchError {
    #[error("SQLx error: {0}")]
    #[diagnostic(
        code(sv_semsearch::sqlx),
        help("The embeddings table shares snoovault's database; check the URL and schema.")
    )]
    Sqlx(#[from] sqlx::Error),

    #[error("embedding provider error: {0}")]
    #[diagnostic(
        code(sv_semsearch::provider),
        help("Check the provider credentials and the batch size against the model's limits.")
    )]
    Provider(#[from] EmbeddingError),

    #[error("provider returned {got} vectors for {expected} inputs")]
    #[diagnostic(code(sv_semsearch::batch_mismatch))]
    BatchMismatch { expected: usize, got: usize },

    #[error("stored vector for {id} is not a whole number of f32 values ({len} bytes)")]
    #[diagnostic(
        code(sv_semsearch::bad_blob),
        help("Vectors persist as little-endian f32 blobs; delete the row and re-embed.")
    )]
    BadBlob { id: String, len: usize },
}
