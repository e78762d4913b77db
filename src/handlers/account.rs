use axum::{extract::State, Json};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::Result;
use crate::models::{ChangePassword, UpdateAccount, UserResponse};
use crate::state::AppState;
use crate::validation::{FieldErrors, PASSWORD_MIN, USERNAME_MAX, USERNAME_MIN};

pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(auth.user.into())
}

pub async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateAccount>,
) -> Result<Json<UserResponse>> {
    let username = input.username.trim();
    let email = input.email.trim();
    let me = auth.user.id;

    let mut errors = FieldErrors::new();
    errors.check_length("username", username, USERNAME_MIN, USERNAME_MAX);
    errors.check_email("email", email);
    if errors.get("username").is_none() && state.users.username_taken(username, Some(me)).await? {
        errors.add("username", "This username is already taken");
    }
    if errors.get("email").is_none() && state.users.email_taken(email, Some(me)).await? {
        errors.add("email", "This email is already registered");
    }
    errors.into_result()?;

    let user = state.users.update_account(me, username, email).await?;
    Ok(Json(user.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePassword>,
) -> Result<()> {
    let mut errors = FieldErrors::new();
    if !verify_password(&input.current_password, &auth.user.password_hash)? {
        errors.add("current_password", "Current password is incorrect");
    }
    if input.new_password.chars().count() < PASSWORD_MIN {
        errors.add(
            "new_password",
            format!("Password must be at least {} characters", PASSWORD_MIN),
        );
    }
    errors.into_result()?;

    let password_hash = hash_password(&input.new_password)?;
    state
        .users
        .update_password(auth.user.id, &password_hash)
        .await?;

    tracing::info!(user_id = %auth.user.id, "password changed");
    Ok(())
}
