use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::card::CardResponse;

/// A column of one board. `position` is `max + 1` of its siblings at
/// creation and is never renumbered, so gaps after a delete are expected.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Position is assigned by the server, never taken from the client.
#[derive(Debug, Deserialize)]
pub struct CreateColumn {
    pub name: String,
}

/// Rename only; columns are not reordered.
#[derive(Debug, Deserialize)]
pub struct UpdateColumn {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ColumnResponse {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub position: i32,
    /// Present in the board view only, in creation order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<CardResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn into_response(self, cards: Option<Vec<CardResponse>>) -> ColumnResponse {
        ColumnResponse {
            id: self.id,
            board_id: self.board_id,
            name: self.name,
            position: self.position,
            cards,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn column() -> Column {
        Column {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            name: "Todo".to_string(),
            position: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cards_only_serialized_when_loaded() {
        let bare = serde_json::to_value(column().into_response(None)).unwrap();
        assert!(bare.get("cards").is_none());
        assert_eq!(bare["position"], 3);

        let loaded = serde_json::to_value(column().into_response(Some(vec![]))).unwrap();
        assert_eq!(loaded["cards"], Value::Array(vec![]));
    }
}
