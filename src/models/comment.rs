use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    /// Set on creation, refreshed on every edit.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

/// Comment with author info joined from users table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub author_username: String,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            id: c.id,
            card_id: c.card_id,
            author_id: c.author_id,
            author_username: c.author_username,
            body: c.body,
            timestamp: c.timestamp,
        }
    }
}

impl Comment {
    pub fn into_response(self, author_username: String) -> CommentResponse {
        CommentResponse {
            id: self.id,
            card_id: self.card_id,
            author_id: self.author_id,
            author_username,
            body: self.body,
            timestamp: self.timestamp,
        }
    }
}
