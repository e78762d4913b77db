use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Board, BoardAccess, BoardRole, User, UserSummary};

#[derive(Clone)]
pub struct BoardRepository {
    pool: Arc<SqlitePool>,
}

impl BoardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, owner_id: Uuid) -> Result<Board> {
        let id = Uuid::new_v4();

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (id, name, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        tracing::info!(board_id = %board.id, owner_id = %owner_id, "created board");
        Ok(board)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>> {
        let board = sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(board)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Board> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Loads the board with its member ids for permission checks.
    pub async fn load_access(&self, id: Uuid) -> Result<BoardAccess> {
        let board = self.get_by_id(id).await?;
        let member_ids = self.member_ids(id).await?;
        Ok(BoardAccess::new(board, member_ids))
    }

    pub async fn member_ids(&self, board_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM board_members WHERE board_id = $1",
        )
        .bind(board_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    pub async fn list_members(&self, board_id: Uuid) -> Result<Vec<UserSummary>> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username FROM users u
            INNER JOIN board_members bm ON u.id = bm.user_id
            WHERE bm.board_id = $1
            ORDER BY u.username COLLATE NOCASE ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(members)
    }

    /// Owner plus members, sorted case-insensitively by username.
    pub async fn eligible_assignees(&self, board_id: Uuid) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username FROM users u
            WHERE u.id = (SELECT owner_id FROM boards WHERE id = $1)
               OR u.id IN (SELECT user_id FROM board_members WHERE board_id = $1)
            ORDER BY u.username COLLATE NOCASE ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    /// Owned boards plus shared boards, each with the user's role.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<(Board, BoardRole)>> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT b.* FROM boards b
            WHERE b.owner_id = $1
               OR b.id IN (SELECT board_id FROM board_members WHERE user_id = $1)
            ORDER BY b.name COLLATE NOCASE ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(boards
            .into_iter()
            .map(|b| {
                let role = if b.owner_id == user_id {
                    BoardRole::Owner
                } else {
                    BoardRole::Member
                };
                (b, role)
            })
            .collect())
    }

    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Board> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = $2, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        board.ok_or(AppError::NotFound)
    }

    /// Adds `identifier` (email or username) to the board's members.
    /// An email match wins over a username that happens to equal it.
    pub async fn invite(&self, access: &BoardAccess, identifier: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE email = $1 OR username = $1
            ORDER BY (email = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

        if access.is_owner(user.id) {
            return Err(AppError::Conflict(
                "User is the owner of this board".to_string(),
            ));
        }
        if access.is_member(user.id) {
            return Err(AppError::Conflict(
                "User is already a member of this board".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id, created_at)
            VALUES ($1, $2, datetime('now'))
            "#,
        )
        .bind(access.id())
        .bind(user.id)
        .execute(self.pool.as_ref())
        .await?;

        tracing::info!(board_id = %access.id(), user_id = %user.id, "invited member");
        Ok(user)
    }

    /// Drops a membership and unassigns the user from every card on this
    /// board. Returns how many assignments were cleared.
    pub async fn remove_member(&self, board_id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        let unassigned = sqlx::query(
            r#"
            DELETE FROM card_assignees
            WHERE user_id = $2
              AND card_id IN (
                SELECT c.id FROM cards c
                INNER JOIN columns col ON c.column_id = col.id
                WHERE col.board_id = $1
              )
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        tracing::info!(board_id = %board_id, user_id = %user_id, unassigned, "removed member");
        Ok(unassigned)
    }

    /// Deletes the board and everything hanging off it, children first.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        delete_board_rows(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(board_id = %id, "deleted board");
        Ok(())
    }
}

const BOARD_CARDS: &str = r#"
    SELECT c.id FROM cards c
    INNER JOIN columns col ON c.column_id = col.id
    WHERE col.board_id = $1
"#;

async fn delete_board_rows(conn: &mut SqliteConnection, board_id: Uuid) -> Result<()> {
    let card_scoped = [
        format!("DELETE FROM comments WHERE card_id IN ({BOARD_CARDS})"),
        format!("DELETE FROM card_assignees WHERE card_id IN ({BOARD_CARDS})"),
        format!("DELETE FROM card_tags WHERE card_id IN ({BOARD_CARDS})"),
        format!("DELETE FROM cards WHERE id IN ({BOARD_CARDS})"),
    ];
    for sql in &card_scoped {
        sqlx::query(sql).bind(board_id).execute(&mut *conn).await?;
    }

    for sql in [
        "DELETE FROM columns WHERE board_id = $1",
        "DELETE FROM card_tags WHERE tag_id IN (SELECT id FROM tags WHERE board_id = $1)",
        "DELETE FROM tags WHERE board_id = $1",
        "DELETE FROM board_members WHERE board_id = $1",
    ] {
        sqlx::query(sql).bind(board_id).execute(&mut *conn).await?;
    }

    let result = sqlx::query("DELETE FROM boards WHERE id = $1")
        .bind(board_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}
