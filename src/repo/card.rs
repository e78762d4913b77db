use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::relation::{self, SetDiff};
use crate::models::{BoardAccess, Card, UserSummary};

#[derive(Clone)]
pub struct CardRepository {
    pool: Arc<SqlitePool>,
}

impl CardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Creates a card with its initial assignees and tags in one
    /// transaction. Ineligible ids are dropped.
    pub async fn create(
        &self,
        access: &BoardAccess,
        column_id: Uuid,
        title: &str,
        description: Option<&str>,
        assignee_ids: &[Uuid],
        tag_ids: &[Uuid],
    ) -> Result<Card> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, column_id, title, description, created_at, updated_at)
            VALUES ($1, $2, $3, NULLIF($4, ''), datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(column_id)
        .bind(title)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        replace_assignees(&mut *tx, card.id, &access.eligible_assignee_ids(), assignee_ids).await?;
        replace_tags(&mut *tx, card.id, access.id(), tag_ids).await?;

        tx.commit().await?;
        Ok(card)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>> {
        let card = sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(card)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Card> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Cards of a column in insertion order.
    pub async fn list_by_column(&self, column_id: Uuid) -> Result<Vec<Card>> {
        let cards = sqlx::query_as::<_, Card>(
            "SELECT * FROM cards WHERE column_id = $1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(column_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(cards)
    }

    pub async fn get_board_id_for_card(&self, card_id: Uuid) -> Result<Uuid> {
        let board_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT col.board_id FROM cards c
            INNER JOIN columns col ON c.column_id = col.id
            WHERE c.id = $1
            "#,
        )
        .bind(card_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        board_id.ok_or(AppError::NotFound)
    }

    /// Updates the given fields. `None` relation lists are left as they are;
    /// an empty description clears it.
    pub async fn update(
        &self,
        access: &BoardAccess,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        assignee_ids: Option<&[Uuid]>,
        tag_ids: Option<&[Uuid]>,
    ) -> Result<Card> {
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 IS NULL THEN description ELSE NULLIF($3, '') END,
                updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

        if let Some(ids) = assignee_ids {
            replace_assignees(&mut *tx, id, &access.eligible_assignee_ids(), ids).await?;
        }
        if let Some(ids) = tag_ids {
            replace_tags(&mut *tx, id, access.id(), ids).await?;
        }

        tx.commit().await?;
        Ok(card)
    }

    /// Makes the card's assignees equal to the eligible part of `user_ids`.
    /// Calling it twice with the same ids changes nothing the second time.
    pub async fn set_assignees(
        &self,
        access: &BoardAccess,
        card_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<SetDiff> {
        let mut tx = self.pool.begin().await?;
        let eligible = access.eligible_assignee_ids();
        let diff = replace_assignees(&mut *tx, card_id, &eligible, user_ids).await?;
        tx.commit().await?;

        tracing::debug!(
            card_id = %card_id,
            added = diff.added.len(),
            removed = diff.removed.len(),
            "set assignees"
        );
        Ok(diff)
    }

    /// Same as [`set_assignees`](Self::set_assignees), filtered to the board's
    /// own tags.
    pub async fn set_tags(
        &self,
        board_id: Uuid,
        card_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<SetDiff> {
        let mut tx = self.pool.begin().await?;
        let diff = replace_tags(&mut *tx, card_id, board_id, tag_ids).await?;
        tx.commit().await?;

        tracing::debug!(
            card_id = %card_id,
            added = diff.added.len(),
            removed = diff.removed.len(),
            "set tags"
        );
        Ok(diff)
    }

    pub async fn list_assignees(&self, card_id: Uuid) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username FROM users u
            INNER JOIN card_assignees ca ON u.id = ca.user_id
            WHERE ca.card_id = $1
            ORDER BY u.username COLLATE NOCASE ASC
            "#,
        )
        .bind(card_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    /// Reassigns the card to another column. The card keeps its creation
    /// timestamp, so it sorts among the target's cards by insertion.
    pub async fn move_to_column(&self, id: Uuid, column_id: Uuid) -> Result<Card> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET column_id = $2, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(column_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        card.ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for sql in [
            "DELETE FROM comments WHERE card_id = $1",
            "DELETE FROM card_assignees WHERE card_id = $1",
            "DELETE FROM card_tags WHERE card_id = $1",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn replace_assignees(
    conn: &mut SqliteConnection,
    card_id: Uuid,
    eligible: &HashSet<Uuid>,
    requested: &[Uuid],
) -> Result<SetDiff> {
    let current =
        sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM card_assignees WHERE card_id = $1")
            .bind(card_id)
            .fetch_all(&mut *conn)
            .await?;

    let desired = relation::eligible_subset(requested, eligible);
    let diff = relation::diff(&current, &desired);

    for user_id in &diff.removed {
        sqlx::query("DELETE FROM card_assignees WHERE card_id = $1 AND user_id = $2")
            .bind(card_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }
    for user_id in &diff.added {
        sqlx::query(
            r#"
            INSERT INTO card_assignees (card_id, user_id, created_at)
            VALUES ($1, $2, datetime('now'))
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(diff)
}

async fn replace_tags(
    conn: &mut SqliteConnection,
    card_id: Uuid,
    board_id: Uuid,
    requested: &[Uuid],
) -> Result<SetDiff> {
    let board_tags: HashSet<Uuid> =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tags WHERE board_id = $1")
            .bind(board_id)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .collect();

    let current = sqlx::query_scalar::<_, Uuid>("SELECT tag_id FROM card_tags WHERE card_id = $1")
        .bind(card_id)
        .fetch_all(&mut *conn)
        .await?;

    let desired = relation::eligible_subset(requested, &board_tags);
    let diff = relation::diff(&current, &desired);

    for tag_id in &diff.removed {
        sqlx::query("DELETE FROM card_tags WHERE card_id = $1 AND tag_id = $2")
            .bind(card_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    for tag_id in &diff.added {
        sqlx::query(
            "INSERT INTO card_tags (card_id, tag_id, created_at) VALUES ($1, $2, datetime('now'))",
        )
        .bind(card_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(diff)
}
