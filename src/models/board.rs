use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    Owner,
    Member,
}

impl BoardRole {
    /// Columns, cards, assignees, tags and comments.
    pub fn can_edit(&self) -> bool {
        matches!(self, BoardRole::Owner | BoardRole::Member)
    }

    /// Renaming or deleting the board and managing its members.
    pub fn can_administer(&self) -> bool {
        matches!(self, BoardRole::Owner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A board together with its member set, loaded up front so that every
/// permission question is answered without touching the database.
#[derive(Debug, Clone)]
pub struct BoardAccess {
    pub board: Board,
    pub member_ids: HashSet<Uuid>,
}

impl BoardAccess {
    pub fn new(board: Board, member_ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            board,
            member_ids: member_ids.into_iter().collect(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.board.id
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.board.owner_id == user_id
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// Ownership wins over membership; a user with neither has no role.
    pub fn role_of(&self, user_id: Uuid) -> Option<BoardRole> {
        if self.is_owner(user_id) {
            Some(BoardRole::Owner)
        } else if self.is_member(user_id) {
            Some(BoardRole::Member)
        } else {
            None
        }
    }

    pub fn can_edit(&self, user_id: Uuid) -> bool {
        self.role_of(user_id).is_some_and(|r| r.can_edit())
    }

    pub fn can_administer(&self, user_id: Uuid) -> bool {
        self.role_of(user_id).is_some_and(|r| r.can_administer())
    }

    /// The owner may remove anyone but themselves; a member may remove
    /// only themselves.
    pub fn can_remove_member(&self, actor_id: Uuid, target_id: Uuid) -> bool {
        if self.is_owner(actor_id) {
            target_id != actor_id
        } else {
            actor_id == target_id && !self.is_owner(target_id)
        }
    }

    /// Owner plus members: the only users that may be assigned to cards.
    pub fn eligible_assignee_ids(&self) -> HashSet<Uuid> {
        let mut ids = self.member_ids.clone();
        ids.insert(self.board.owner_id);
        ids
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBoard {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoard {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteMember {
    /// Email address or username.
    pub identifier: String,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub role: BoardRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn into_response(self, role: BoardRole) -> BoardResponse {
        BoardResponse {
            id: self.id,
            name: self.name,
            owner_id: self.owner_id,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BoardWithDetails {
    pub id: Uuid,
    pub name: String,
    pub role: BoardRole,
    pub owner: UserSummary,
    pub members: Vec<UserSummary>,
    pub eligible_assignees: Vec<UserSummary>,
    pub columns: Vec<super::column::ColumnResponse>,
    pub tags: Vec<super::tag::TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(owner_id: Uuid) -> Board {
        Board {
            id: Uuid::new_v4(),
            name: "Roadmap".to_string(),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_permissions_over_membership_combinations() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();

        for members in [vec![], vec![member], vec![member, outsider]] {
            let access = BoardAccess::new(board(owner), members.clone());
            for user in [owner, member, outsider] {
                let is_owner = user == owner;
                let is_member = members.contains(&user);
                assert_eq!(access.can_edit(user), is_owner || is_member);
                assert_eq!(access.can_administer(user), is_owner);
            }
        }
    }

    #[test]
    fn test_owner_listed_as_member_is_still_owner() {
        let owner = Uuid::new_v4();
        let access = BoardAccess::new(board(owner), vec![owner]);
        assert_eq!(access.role_of(owner), Some(BoardRole::Owner));
        assert!(access.can_administer(owner));
    }

    #[test]
    fn test_member_removal_rules() {
        let owner = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let access = BoardAccess::new(board(owner), vec![alice, bob]);

        assert!(access.can_remove_member(owner, alice));
        assert!(!access.can_remove_member(owner, owner));
        assert!(access.can_remove_member(alice, alice));
        assert!(!access.can_remove_member(alice, bob));
        assert!(!access.can_remove_member(alice, owner));
    }

    #[test]
    fn test_eligible_assignees_include_owner() {
        let owner = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let access = BoardAccess::new(board(owner), vec![alice]);
        let eligible = access.eligible_assignee_ids();
        assert_eq!(eligible.len(), 2);
        assert!(eligible.contains(&owner));
        assert!(eligible.contains(&alice));
    }
}
