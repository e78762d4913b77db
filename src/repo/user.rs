use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: Arc<SqlitePool>,
}

impl UserRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY username COLLATE NOCASE ASC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    /// True if another user (not `except`) already holds this username.
    pub async fn username_taken(&self, username: &str, except: Option<Uuid>) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = $1 AND ($2 IS NULL OR id != $2)",
        )
        .bind(username)
        .bind(except)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count > 0)
    }

    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE email = $1 AND ($2 IS NULL OR id != $2)",
        )
        .bind(email)
        .bind(except)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count > 0)
    }

    pub async fn update_account(&self, id: Uuid, username: &str, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        user.ok_or(AppError::NotFound)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = datetime('now') WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    pub async fn admin_update(&self, id: Uuid, username: &str, is_admin: bool) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, is_admin = $3, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(is_admin)
        .fetch_optional(self.pool.as_ref())
        .await?;

        user.ok_or(AppError::NotFound)
    }

    pub async fn count_admins(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_admin")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    /// Deletes a user who owns no boards, together with their sessions,
    /// memberships, card assignments and authored comments.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM boards WHERE owner_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if owned > 0 {
            return Err(AppError::Conflict(
                "User owns boards; delete or hand them over first".to_string(),
            ));
        }

        for sql in [
            "DELETE FROM sessions WHERE user_id = $1",
            "DELETE FROM board_members WHERE user_id = $1",
            "DELETE FROM card_assignees WHERE user_id = $1",
            "DELETE FROM comments WHERE author_id = $1",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;
        tracing::info!(user_id = %id, "deleted user");
        Ok(())
    }

    /// Grants or revokes the admin flag without touching the username.
    pub async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_admin = $2, updated_at = datetime('now') WHERE id = $1")
            .bind(id)
            .bind(is_admin)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
