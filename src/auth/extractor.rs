use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use crate::auth::hash_token;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The authenticated actor of a request.
pub struct AuthUser {
    pub user: User,
    pub session_token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let cookies = CookieJar::from_request_parts(parts, &state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        // Session cookie first, then the same token as a bearer header
        let token = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => Some(cookie.value().to_string()),
            None => parts
                .headers
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(str::to_string),
        };
        let token = token.ok_or(AppError::Unauthorized)?;

        let session = state
            .sessions
            .find_by_token_hash(&hash_token(&token))
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = state
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            user,
            session_token: token,
        })
    }
}

/// An authenticated actor with the admin flag set.
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.user.is_admin {
            return Err(AppError::forbidden("Administrator access required"));
        }
        Ok(AdminUser(auth.user))
    }
}
