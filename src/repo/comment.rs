use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, CommentWithAuthor};

#[derive(Clone)]
pub struct CommentRepository {
    pool: Arc<SqlitePool>,
}

impl CommentRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Create a new comment on a card
    pub async fn create(&self, card_id: Uuid, author_id: Uuid, body: &str) -> Result<Comment> {
        let id = Uuid::new_v4();

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, card_id, author_id, body, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(card_id)
        .bind(author_id)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(comment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(comment)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Comment> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Comments of a card, oldest first
    pub async fn list_by_card(&self, card_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.card_id, c.author_id, c.body, c.timestamp,
                   u.username as author_username
            FROM comments c
            INNER JOIN users u ON c.author_id = u.id
            WHERE c.card_id = $1
            ORDER BY c.timestamp ASC, c.rowid ASC
            "#,
        )
        .bind(card_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(comments)
    }

    /// Replaces the body and refreshes the timestamp
    pub async fn update(&self, id: Uuid, body: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET body = $2, timestamp = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(body)
        .bind(Utc::now())
        .fetch_optional(self.pool.as_ref())
        .await?;

        comment.ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
