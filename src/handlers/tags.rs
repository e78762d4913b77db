use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::editable_board;
use crate::models::{CreateTag, TagResponse, UpdateTag, DEFAULT_TAG_COLOR};
use crate::state::AppState;
use crate::validation::{FieldErrors, TAG_NAME_MAX};

pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<CreateTag>,
) -> Result<Json<TagResponse>> {
    editable_board(&state, board_id, auth.user.id).await?;

    let name = input.name.trim();
    let color = input
        .color
        .as_deref()
        .map(str::trim)
        .unwrap_or(DEFAULT_TAG_COLOR);

    let mut errors = FieldErrors::new();
    errors.check_length("name", name, 1, TAG_NAME_MAX);
    errors.check_color("color", color);
    errors.into_result()?;

    let tag = state.tags.create(board_id, name, color).await?;
    Ok(Json(tag.into()))
}

pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Vec<TagResponse>>> {
    editable_board(&state, board_id, auth.user.id).await?;

    let tags = state.tags.list_by_board(board_id).await?;
    Ok(Json(tags.into_iter().map(|t| t.into()).collect()))
}

pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tag_id): Path<Uuid>,
    Json(input): Json<UpdateTag>,
) -> Result<Json<TagResponse>> {
    let tag = state.tags.get_by_id(tag_id).await?;
    editable_board(&state, tag.board_id, auth.user.id).await?;

    let name = input.name.as_deref().map(str::trim);
    let color = input.color.as_deref().map(str::trim);

    let mut errors = FieldErrors::new();
    if let Some(name) = name {
        errors.check_length("name", name, 1, TAG_NAME_MAX);
    }
    if let Some(color) = color {
        errors.check_color("color", color);
    }
    errors.into_result()?;

    let updated = state.tags.update(&tag, name, color).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tag_id): Path<Uuid>,
) -> Result<()> {
    let tag = state.tags.get_by_id(tag_id).await?;
    editable_board(&state, tag.board_id, auth.user.id).await?;

    state.tags.delete(tag_id).await?;
    Ok(())
}
