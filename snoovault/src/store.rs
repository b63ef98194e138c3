//! SQLite-backed storage for posts and progress.
//!
//! [`PostStore`] owns the connection pool and the schema (embedded
//! migrations, run on connect, idempotent). It exposes reads and the
//! checkpoint lookup; all writes go through [`crate::writer::BatchWriter`],
//! which is the only component permitted to mutate either table.

use std::str::FromStr;

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use tracing::instrument;

use crate::errors::StoreError;
use crate::model::{Checkpoint, Cursor, Post};

/// Durable store for ingested posts and per-subreddit progress.
#[derive(Clone, Debug)]
pub struct PostStore {
    pool: SqlitePool,
}

impl PostStore {
    /// Connect to (or create) the SQLite database at `database_url` and run
    /// the embedded migrations.
    ///
    /// Example URL: `sqlite://snoovault.db`.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// The shared pool, for collaborators that live in the same database.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Load the checkpoint for `subreddit`, if one has ever been written.
    #[instrument(skip(self), err)]
    pub async fn load_checkpoint(&self, subreddit: &str) -> Result<Option<Checkpoint>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT last_seen_id, oldest_created
            FROM progress
            WHERE subreddit = ?1
            "#,
        )
        .bind(subreddit)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Checkpoint {
            subreddit: subreddit.to_string(),
            cursor: Cursor::new(row.get::<String, _>("last_seen_id")),
            frontier: row.get::<i64, _>("oldest_created"),
        }))
    }

    /// Number of posts stored for `subreddit`.
    pub async fn count_posts(&self, subreddit: &str) -> Result<u64, StoreError> {
        let row = sqlx::query(r#"SELECT COUNT(*) AS n FROM posts WHERE subreddit = ?1"#)
            .bind(subreddit)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    /// Fetch a single post by id.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, subreddit, created_utc, num_comments, score, upvote_ratio, title, url
            FROM posts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| post_from_row(&row)))
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        subreddit: row.get("subreddit"),
        created_utc: row.get("created_utc"),
        num_comments: row.get("num_comments"),
        score: row.get("score"),
        upvote_ratio: row.get("upvote_ratio"),
        title: row.get("title"),
        url: row.get("url"),
    }
}
