use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{
    generate_token, hash_password, hash_token, verify_password, AuthUser, SESSION_COOKIE,
};
use crate::error::{AppError, Result};
use crate::models::{CreateUser, UserResponse};
use crate::state::AppState;
use crate::validation::{FieldErrors, PASSWORD_MIN, USERNAME_MAX, USERNAME_MIN};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Only set on login, for clients that send `Authorization: Bearer`.
    pub token: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<Json<AuthResponse>> {
    let username = input.username.trim();
    let email = input.email.trim();

    let mut errors = FieldErrors::new();
    errors.check_length("username", username, USERNAME_MIN, USERNAME_MAX);
    errors.check_email("email", email);
    if input.password.chars().count() < PASSWORD_MIN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN),
        );
    }
    if errors.get("username").is_none() && state.users.username_taken(username, None).await? {
        errors.add("username", "This username is already taken");
    }
    if errors.get("email").is_none() && state.users.email_taken(email, None).await? {
        errors.add("email", "This email is already registered");
    }
    errors.into_result()?;

    let password_hash = hash_password(&input.password)?;
    let id = Uuid::new_v4();
    let mut user = state
        .users
        .create(id, username, email, &password_hash)
        .await?;

    if state.settings.is_admin_email(email) {
        state.users.set_admin(user.id, true).await?;
        user.is_admin = true;
    }

    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "registered user");

    Ok(Json(AuthResponse {
        user: user.into(),
        token: None,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state
        .users
        .find_by_email(input.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = generate_token();
    state
        .sessions
        .create(user.id, &hash_token(&token), state.settings.session_ttl()?)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            user: user.into(),
            token: Some(token),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<CookieJar> {
    state
        .sessions
        .delete_by_token_hash(&hash_token(&auth.session_token))
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .build();

    Ok(jar.add(cookie))
}
