use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::editable_board;
use crate::models::{ColumnResponse, CreateColumn, UpdateColumn};
use crate::state::AppState;
use crate::validation::{FieldErrors, COLUMN_NAME_MAX};

fn validate_name(name: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.check_length("name", name, 1, COLUMN_NAME_MAX);
    errors.into_result()
}

pub async fn create_column(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<CreateColumn>,
) -> Result<Json<ColumnResponse>> {
    editable_board(&state, board_id, auth.user.id).await?;

    let name = input.name.trim();
    validate_name(name)?;

    let column = state.columns.create(board_id, name).await?;
    Ok(Json(column.into_response(None)))
}

pub async fn list_columns(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Vec<ColumnResponse>>> {
    editable_board(&state, board_id, auth.user.id).await?;

    let columns = state.columns.list_by_board(board_id).await?;
    Ok(Json(columns.into_iter().map(|c| c.into_response(None)).collect()))
}

pub async fn update_column(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(column_id): Path<Uuid>,
    Json(input): Json<UpdateColumn>,
) -> Result<Json<ColumnResponse>> {
    let column = state.columns.get_by_id(column_id).await?;
    editable_board(&state, column.board_id, auth.user.id).await?;

    let name = input.name.trim();
    validate_name(name)?;

    let updated = state.columns.rename(column_id, name).await?;
    Ok(Json(updated.into_response(None)))
}

pub async fn delete_column(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(column_id): Path<Uuid>,
) -> Result<()> {
    let column = state.columns.get_by_id(column_id).await?;
    editable_board(&state, column.board_id, auth.user.id).await?;

    state.columns.delete(column_id).await?;
    Ok(())
}
