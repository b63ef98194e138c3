//! Embedding persistence, sharing snoovault's database.
//!
//! The `embeddings` table belongs to this crate alone; the ingestion core
//! never reads or writes it, so the schema is created lazily here instead
//! of joining the core's migration history. Unlike posts, embedding rows use
//! `INSERT OR REPLACE`: vectors are derived data and may be regenerated.

use snoovault::PostStore;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::instrument;

use crate::errors::SemSearchError;
use crate::vector;

/// Store for `(id, vector)` rows keyed by post id.
#[derive(Clone, Debug)]
pub struct EmbeddingStore {
    pool: SqlitePool,
}

impl EmbeddingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Share the pool of an already-connected post store.
    pub fn for_posts(store: &PostStore) -> Self {
        Self::new(store.pool().clone())
    }

    /// Create the embeddings table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), SemSearchError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                id TEXT PRIMARY KEY,
                vector BLOB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// `(id, title)` of posts that have no stored vector yet, newest first,
    /// capped at `limit`.
    pub async fn pending_posts(&self, limit: u32) -> Result<Vec<(String, String)>, SemSearchError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.title
            FROM posts p
            LEFT JOIN embeddings e ON e.id = p.id
            WHERE e.id IS NULL
            ORDER BY p.created_utc DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get::<String, _>("id"), row.get::<String, _>("title")))
            .collect())
    }

    /// Persist a batch of vectors, replacing any existing rows.
    pub async fn save_embeddings(
        &self,
        rows: &[(String, Vec<f32>)],
    ) -> Result<(), SemSearchError> {
        let mut tx = self.pool.begin().await?;
        for (id, vector) in rows {
            sqlx::query(r#"INSERT OR REPLACE INTO embeddings (id, vector) VALUES (?1, ?2)"#)
                .bind(id)
                .bind(vector::to_blob(vector))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Load every stored `(id, vector)` pair for a linear similarity scan.
    pub async fn load_all(&self) -> Result<Vec<(String, Vec<f32>)>, SemSearchError> {
        let rows = sqlx::query(r#"SELECT id, vector FROM embeddings"#)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let id: String = row.get("id");
                let blob: Vec<u8> = row.get("vector");
                let len = blob.len();
                vector::from_blob(&blob)
                    .map(|vector| (id.clone(), vector))
                    .ok_or(SemSearchError::BadBlob { id, len })
            })
            .collect()
    }

    /// Number of stored vectors.
    pub async fn count(&self) -> Result<u64, SemSearchError> {
        let row = sqlx::query(r#"SELECT COUNT(*) AS n FROM embeddings"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    /// Title of the post behind a hit, if the post still exists.
    pub async fn title_for(&self, id: &str) -> Result<Option<String>, SemSearchError> {
        let row = sqlx::query(r#"SELECT title FROM posts WHERE id = ?1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get::<String, _>("title")))
    }
}
