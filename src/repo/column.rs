use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Column;

#[derive(Clone)]
pub struct ColumnRepository {
    pool: Arc<SqlitePool>,
}

impl ColumnRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Appends a column after the highest existing position, or at 0.
    /// Positions are never renumbered, so deletions leave gaps.
    pub async fn create(&self, board_id: Uuid, name: &str) -> Result<Column> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let max_pos = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(position) FROM columns WHERE board_id = $1",
        )
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;
        let pos = max_pos.map_or(0, |p| p + 1);

        let column = sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO columns (id, board_id, name, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(board_id)
        .bind(name)
        .bind(pos)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(column)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Column>> {
        let column = sqlx::query_as::<_, Column>("SELECT * FROM columns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(column)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Column> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Column>> {
        let columns = sqlx::query_as::<_, Column>(
            "SELECT * FROM columns WHERE board_id = $1 ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(columns)
    }

    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Column> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            UPDATE columns
            SET name = $2,
                updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        column.ok_or(AppError::NotFound)
    }

    /// Deletes the column with its cards and their comments and
    /// association rows.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for sql in [
            "DELETE FROM comments WHERE card_id IN (SELECT id FROM cards WHERE column_id = $1)",
            "DELETE FROM card_assignees WHERE card_id IN \
             (SELECT id FROM cards WHERE column_id = $1)",
            "DELETE FROM card_tags WHERE card_id IN (SELECT id FROM cards WHERE column_id = $1)",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }

        let cards = sqlx::query("DELETE FROM cards WHERE column_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM columns WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;
        tracing::debug!(column_id = %id, cards, "deleted column");
        Ok(())
    }
}
