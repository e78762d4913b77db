use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::handlers::editable_board;
use crate::models::{CommentResponse, CreateComment, UpdateComment};
use crate::state::AppState;
use crate::validation::{FieldErrors, COMMENT_MAX};

fn validate_body(body: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.check_length("body", body, 1, COMMENT_MAX);
    errors.into_result()
}

/// Board access is comment access: owners and members may read and write.
async fn ensure_card_access(state: &AppState, card_id: Uuid, user_id: Uuid) -> Result<()> {
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    editable_board(state, board_id, user_id).await?;
    Ok(())
}

pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>> {
    ensure_card_access(&state, card_id, auth.user.id).await?;

    let comments = state.comments.list_by_card(card_id).await?;
    Ok(Json(comments.into_iter().map(|c| c.into()).collect()))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<CreateComment>,
) -> Result<Json<CommentResponse>> {
    ensure_card_access(&state, card_id, auth.user.id).await?;

    let body = input.body.trim();
    validate_body(body)?;

    let comment = state.comments.create(card_id, auth.user.id, body).await?;
    Ok(Json(comment.into_response(auth.user.username)))
}

/// Only the author can edit; the timestamp is refreshed.
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(input): Json<UpdateComment>,
) -> Result<Json<CommentResponse>> {
    let comment = state.comments.get_by_id(comment_id).await?;
    if comment.author_id != auth.user.id {
        return Err(AppError::forbidden("You can only edit your own comments"));
    }

    let body = input.body.trim();
    validate_body(body)?;

    let updated = state.comments.update(comment_id, body).await?;
    Ok(Json(updated.into_response(auth.user.username)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<()> {
    let comment = state.comments.get_by_id(comment_id).await?;
    if comment.author_id != auth.user.id {
        return Err(AppError::forbidden("You can only delete your own comments"));
    }

    state.comments.delete(comment_id).await?;
    Ok(())
}
