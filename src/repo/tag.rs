use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Tag;

const DUPLICATE_NAME: &str = "A tag with this name already exists on this board";

#[derive(Clone)]
pub struct TagRepository {
    pool: Arc<SqlitePool>,
}

impl TagRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Create a board-scoped tag. Names are unique per board.
    pub async fn create(&self, board_id: Uuid, name: &str, color: &str) -> Result<Tag> {
        if self.name_taken(board_id, name, None).await? {
            return Err(AppError::field("name", DUPLICATE_NAME));
        }

        let id = Uuid::new_v4();

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, board_id, name, color, created_at)
            VALUES ($1, $2, $3, $4, datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(board_id)
        .bind(name)
        .bind(color)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(duplicate_as_field_error)?;

        Ok(tag)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(tag)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Tag> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Tag>> {
        let tags =
            sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE board_id = $1 ORDER BY name ASC")
                .bind(board_id)
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(tags)
    }

    pub async fn name_taken(
        &self,
        board_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tags
            WHERE board_id = $1 AND name = $2 AND ($3 IS NULL OR id != $3)
            "#,
        )
        .bind(board_id)
        .bind(name)
        .bind(except)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count > 0)
    }

    pub async fn update(&self, tag: &Tag, name: Option<&str>, color: Option<&str>) -> Result<Tag> {
        if let Some(name) = name {
            if self.name_taken(tag.board_id, name, Some(tag.id)).await? {
                return Err(AppError::field("name", DUPLICATE_NAME));
            }
        }

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = COALESCE($2, name),
                color = COALESCE($3, color)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tag.id)
        .bind(name)
        .bind(color)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(duplicate_as_field_error)?;

        tag.ok_or(AppError::NotFound)
    }

    /// Deletes the tag and detaches it from every card. Cards stay.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query("DELETE FROM card_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;
        tracing::debug!(tag_id = %id, detached, "deleted tag");
        Ok(())
    }

    pub async fn list_for_card(&self, card_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN card_tags ct ON t.id = ct.tag_id
            WHERE ct.card_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(card_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(tags)
    }
}

/// A concurrent insert can still trip the `(board_id, name)` constraint
/// after the pre-check passed.
fn duplicate_as_field_error(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::field("name", DUPLICATE_NAME),
        _ => AppError::Database(err),
    }
}
