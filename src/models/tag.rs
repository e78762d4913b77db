use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Used when a tag is created without a color.
pub const DEFAULT_TAG_COLOR: &str = "#808080";

/// A label scoped to one board; `(board_id, name)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub color: Option<String>,
}

/// Either field may be left out to keep its current value.
#[derive(Debug, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Returned by the tag endpoints and listed on the board view.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// What a card carries for each attached tag. The board is implied by
/// the card.
#[derive(Debug, Clone, Serialize)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            board_id: tag.board_id,
            name: tag.name,
            color: tag.color,
            created_at: tag.created_at,
        }
    }
}

impl From<Tag> for TagSummary {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
        }
    }
}
