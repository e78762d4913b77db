use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::handlers::{administered_board, cards::card_response, editable_board};
use crate::models::{
    BoardResponse, BoardRole, BoardWithDetails, CreateBoard, InviteMember,
    UpdateBoard, UserSummary,
};
use crate::state::AppState;
use crate::validation::{FieldErrors, BOARD_NAME_MAX};

pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateBoard>,
) -> Result<Json<BoardResponse>> {
    let name = input.name.trim();
    let mut errors = FieldErrors::new();
    errors.check_length("name", name, 1, BOARD_NAME_MAX);
    errors.into_result()?;

    let board = state.boards.create(name, auth.user.id).await?;
    Ok(Json(board.into_response(BoardRole::Owner)))
}

pub async fn list_boards(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BoardResponse>>> {
    let boards = state.boards.list_for_user(auth.user.id).await?;

    Ok(Json(
        boards
            .into_iter()
            .map(|(board, role)| board.into_response(role))
            .collect(),
    ))
}

pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<BoardWithDetails>> {
    let access = editable_board(&state, board_id, auth.user.id).await?;
    let role = access
        .role_of(auth.user.id)
        .ok_or_else(|| AppError::forbidden("You do not have access to this board"))?;

    let owner = state.users.get_by_id(access.board.owner_id).await?;
    let members = state.boards.list_members(board_id).await?;
    let eligible_assignees = state.boards.eligible_assignees(board_id).await?;
    let columns = state.columns.list_by_board(board_id).await?;
    let tags = state.tags.list_by_board(board_id).await?;

    let mut column_responses = Vec::new();
    for col in columns {
        let cards = state.cards.list_by_column(col.id).await?;
        let mut card_responses = Vec::with_capacity(cards.len());
        for card in cards {
            card_responses.push(card_response(&state, card).await?);
        }
        column_responses.push(col.into_response(Some(card_responses)));
    }

    let board = access.board;
    Ok(Json(BoardWithDetails {
        id: board.id,
        name: board.name,
        role,
        owner: UserSummary::from(&owner),
        members,
        eligible_assignees,
        columns: column_responses,
        tags: tags.into_iter().map(|t| t.into()).collect(),
        created_at: board.created_at,
        updated_at: board.updated_at,
    }))
}

pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<UpdateBoard>,
) -> Result<Json<BoardResponse>> {
    administered_board(&state, board_id, auth.user.id).await?;

    let name = input.name.trim();
    let mut errors = FieldErrors::new();
    errors.check_length("name", name, 1, BOARD_NAME_MAX);
    errors.into_result()?;

    let board = state.boards.rename(board_id, name).await?;
    Ok(Json(board.into_response(BoardRole::Owner)))
}

pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<()> {
    administered_board(&state, board_id, auth.user.id).await?;
    state.boards.delete(board_id).await?;
    Ok(())
}

pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Vec<UserSummary>>> {
    editable_board(&state, board_id, auth.user.id).await?;
    let members = state.boards.list_members(board_id).await?;
    Ok(Json(members))
}

pub async fn invite_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<InviteMember>,
) -> Result<Json<UserSummary>> {
    let access = administered_board(&state, board_id, auth.user.id).await?;

    let identifier = input.identifier.trim();
    if identifier.is_empty() {
        return Err(AppError::field(
            "identifier",
            "Enter an email address or username",
        ));
    }

    let user = state.boards.invite(&access, identifier).await?;
    Ok(Json(UserSummary::from(&user)))
}

/// The owner removes a member, or a member leaves the board.
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((board_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<()> {
    let access = state.boards.load_access(board_id).await?;

    if !access.can_remove_member(auth.user.id, user_id) {
        return Err(if access.is_owner(user_id) {
            AppError::forbidden("The owner cannot be removed from their own board")
        } else {
            AppError::forbidden("You cannot remove this member")
        });
    }

    state.boards.remove_member(board_id, user_id).await?;
    Ok(())
}
