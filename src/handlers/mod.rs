pub mod account;
pub mod admin;
pub mod auth;
pub mod boards;
pub mod cards;
pub mod columns;
pub mod comments;
pub mod tags;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::BoardAccess;
use crate::state::AppState;

/// Loads a board the actor may edit (owner or member).
pub(crate) async fn editable_board(
    state: &AppState,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<BoardAccess> {
    let access = state.boards.load_access(board_id).await?;
    if !access.can_edit(user_id) {
        return Err(AppError::forbidden("You do not have access to this board"));
    }
    Ok(access)
}

/// Loads a board the actor owns.
pub(crate) async fn administered_board(
    state: &AppState,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<BoardAccess> {
    let access = state.boards.load_access(board_id).await?;
    if !access.can_administer(user_id) {
        return Err(AppError::forbidden("Only the board owner can do this"));
    }
    Ok(access)
}
