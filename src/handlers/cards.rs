use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::handlers::editable_board;
use crate::models::{
    Card, CardResponse, CreateCard, MoveCard, MoveCardResponse, MoveOutcome, SetAssignees,
    SetTags, UpdateCard,
};
use crate::state::AppState;
use crate::validation::{FieldErrors, CARD_DESCRIPTION_MAX, CARD_TITLE_MAX};

/// Materializes a card with its assignees and tags.
pub(crate) async fn card_response(state: &AppState, card: Card) -> Result<CardResponse> {
    let assignees = state.cards.list_assignees(card.id).await?;
    let tags = state.tags.list_for_card(card.id).await?;
    Ok(card.into_response(assignees, tags.into_iter().map(|t| t.into()).collect()))
}

fn validate_card(title: Option<&str>, description: Option<&str>) -> Result<()> {
    let mut errors = FieldErrors::new();
    if let Some(title) = title {
        errors.check_length("title", title, 1, CARD_TITLE_MAX);
    }
    if let Some(description) = description {
        errors.check_length("description", description, 0, CARD_DESCRIPTION_MAX);
    }
    errors.into_result()
}

pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(column_id): Path<Uuid>,
    Json(input): Json<CreateCard>,
) -> Result<Json<CardResponse>> {
    let column = state.columns.get_by_id(column_id).await?;
    let access = editable_board(&state, column.board_id, auth.user.id).await?;

    let title = input.title.trim();
    let description = input.description.as_deref().map(str::trim);
    validate_card(Some(title), description)?;

    let card = state
        .cards
        .create(
            &access,
            column_id,
            title,
            description,
            &input.assignee_ids,
            &input.tag_ids,
        )
        .await?;

    Ok(Json(card_response(&state, card).await?))
}

pub async fn get_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<CardResponse>> {
    let card = state.cards.get_by_id(card_id).await?;
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    editable_board(&state, board_id, auth.user.id).await?;

    Ok(Json(card_response(&state, card).await?))
}

pub async fn update_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<UpdateCard>,
) -> Result<Json<CardResponse>> {
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    let access = editable_board(&state, board_id, auth.user.id).await?;

    let title = input.title.as_deref().map(str::trim);
    let description = input.description.as_deref().map(str::trim);
    validate_card(title, description)?;

    let card = state
        .cards
        .update(
            &access,
            card_id,
            title,
            description,
            input.assignee_ids.as_deref(),
            input.tag_ids.as_deref(),
        )
        .await?;

    Ok(Json(card_response(&state, card).await?))
}

pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<()> {
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    editable_board(&state, board_id, auth.user.id).await?;

    state.cards.delete(card_id).await?;
    Ok(())
}

/// Moves a card to another column of the same board. Moving to the
/// current column succeeds without writing anything.
pub async fn move_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<MoveCard>,
) -> Result<Json<MoveCardResponse>> {
    let card = state.cards.get_by_id(card_id).await?;
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    editable_board(&state, board_id, auth.user.id).await?;

    let target = state
        .columns
        .find_by_id(input.column_id)
        .await?
        .filter(|col| col.board_id == board_id)
        .ok_or_else(|| AppError::BadRequest("Invalid target column".to_string()))?;

    let (outcome, card) = if target.id == card.column_id {
        (MoveOutcome::Unchanged, card)
    } else {
        let moved = state.cards.move_to_column(card_id, target.id).await?;
        tracing::debug!(card_id = %card_id, column_id = %target.id, "moved card");
        (MoveOutcome::Moved, moved)
    };

    Ok(Json(MoveCardResponse {
        outcome,
        card: card_response(&state, card).await?,
    }))
}

pub async fn set_assignees(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<SetAssignees>,
) -> Result<Json<CardResponse>> {
    let card = state.cards.get_by_id(card_id).await?;
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    let access = editable_board(&state, board_id, auth.user.id).await?;

    state
        .cards
        .set_assignees(&access, card_id, &input.user_ids)
        .await?;

    Ok(Json(card_response(&state, card).await?))
}

pub async fn set_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<SetTags>,
) -> Result<Json<CardResponse>> {
    let card = state.cards.get_by_id(card_id).await?;
    let board_id = state.cards.get_board_id_for_card(card_id).await?;
    editable_board(&state, board_id, auth.user.id).await?;

    state
        .cards
        .set_tags(board_id, card_id, &input.tag_ids)
        .await?;

    Ok(Json(card_response(&state, card).await?))
}
