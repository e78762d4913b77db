use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::{AppError, Result};
use crate::models::{AdminUpdateUser, UserResponse};
use crate::state::AppState;
use crate::validation::{FieldErrors, USERNAME_MAX, USERNAME_MIN};

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>> {
    let users = state.users.list_all().await?;
    Ok(Json(users.into_iter().map(|u| u.into()).collect()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<AdminUpdateUser>,
) -> Result<Json<UserResponse>> {
    let target = state.users.get_by_id(user_id).await?;
    let username = input.username.trim();

    let mut errors = FieldErrors::new();
    errors.check_length("username", username, USERNAME_MIN, USERNAME_MAX);
    if errors.get("username").is_none()
        && state.users.username_taken(username, Some(target.id)).await?
    {
        errors.add("username", "This username is already taken");
    }
    errors.into_result()?;

    if target.id == admin.id && !input.is_admin && state.users.count_admins().await? <= 1 {
        return Err(AppError::Conflict(
            "You are the only administrator and cannot revoke your own rights".to_string(),
        ));
    }

    let user = state
        .users
        .admin_update(target.id, username, input.is_admin)
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        is_admin = user.is_admin,
        "admin updated user"
    );
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<()> {
    if user_id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    state.users.delete(user_id).await?;
    Ok(())
}
