use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tag::TagSummary;
use super::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCard {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// Absent relation lists leave the relation untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_ids: Option<Vec<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct MoveCard {
    pub column_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetAssignees {
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetTags {
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveOutcome {
    Moved,
    Unchanged,
}

#[derive(Debug, Serialize)]
pub struct MoveCardResponse {
    pub outcome: MoveOutcome,
    pub card: CardResponse,
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignees: Vec<UserSummary>,
    pub tags: Vec<TagSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn into_response(
        self,
        assignees: Vec<UserSummary>,
        tags: Vec<TagSummary>,
    ) -> CardResponse {
        CardResponse {
            id: self.id,
            column_id: self.column_id,
            title: self.title,
            description: self.description,
            assignees,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
