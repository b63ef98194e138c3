//! Applies fetched pages to storage as a unit.
//!
//! One transaction covers both phases: every post of the page is inserted
//! with `INSERT OR IGNORE` (first-write-wins, so replaying a page after a
//! crash is a no-op), then the progress row is upserted with the trailing
//! post's id and creation time. Commit ordering guarantees the checkpoint
//! never advances ahead of the posts it describes; a crash before commit
//! rolls both back and restart replays at most one page.

use tracing::instrument;

use crate::errors::StoreError;
use crate::model::{Cursor, Page};
use crate::store::PostStore;

/// How the checkpoint advanced after one page was applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Advance {
    /// Rows actually inserted.
    pub inserted: u64,
    /// Rows already present and left untouched.
    pub skipped: u64,
    /// New cursor: the trailing (oldest) post of the page.
    pub cursor: Cursor,
    /// New frontier timestamp: the trailing post's `created_utc`.
    pub frontier: i64,
}

/// The only component permitted to mutate the posts and progress tables.
///
/// One source, one writer; no concurrent writers to the same subreddit are
/// assumed or required.
#[derive(Clone, Debug)]
pub struct BatchWriter {
    store: PostStore,
}

impl BatchWriter {
    pub fn new(store: PostStore) -> Self {
        Self { store }
    }

    /// Apply a non-empty page: insert its posts, then advance the checkpoint.
    ///
    /// Safe to re-apply the same page after a crash between write and
    /// checkpoint advance; existing rows are skipped and the checkpoint
    /// lands on the same value.
    #[instrument(skip(self, page), fields(posts = page.posts.len()), err)]
    pub async fn apply(&self, subreddit: &str, page: &Page) -> Result<Advance, StoreError> {
        let trailing = page.trailing().ok_or_else(|| StoreError::EmptyPage {
            subreddit: subreddit.to_string(),
        })?;

        let mut tx = self.store.pool().begin().await?;

        let mut inserted = 0u64;
        for post in &page.posts {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO posts
                    (id, subreddit, created_utc, num_comments, score, upvote_ratio, title, url)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&post.id)
            .bind(&post.subreddit)
            .bind(post.created_utc)
            .bind(post.num_comments)
            .bind(post.score)
            .bind(post.upvote_ratio)
            .bind(&post.title)
            .bind(&post.url)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        sqlx::query(
            r#"
            INSERT INTO progress (subreddit, last_seen_id, oldest_created)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(subreddit) DO UPDATE SET
                last_seen_id = excluded.last_seen_id,
                oldest_created = excluded.oldest_created
            "#,
        )
        .bind(subreddit)
        .bind(&trailing.id)
        .bind(trailing.created_utc)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Advance {
            inserted,
            skipped: page.posts.len() as u64 - inserted,
            cursor: Cursor::new(trailing.id.clone()),
            frontier: trailing.created_utc,
        })
    }
}
