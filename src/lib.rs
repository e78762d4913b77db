pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod state;
pub mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // Account routes
        .route(
            "/me",
            get(handlers::account::me).put(handlers::account::update_account),
        )
        .route("/me/password", put(handlers::account::change_password))
        // Admin routes
        .route("/admin/users", get(handlers::admin::list_users))
        .route(
            "/admin/users/{user_id}",
            put(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        // Board routes
        .route(
            "/boards",
            post(handlers::boards::create_board).get(handlers::boards::list_boards),
        )
        .route(
            "/boards/{board_id}",
            get(handlers::boards::get_board)
                .put(handlers::boards::update_board)
                .delete(handlers::boards::delete_board),
        )
        .route(
            "/boards/{board_id}/members",
            get(handlers::boards::list_members).post(handlers::boards::invite_member),
        )
        .route(
            "/boards/{board_id}/members/{user_id}",
            delete(handlers::boards::remove_member),
        )
        // Column routes
        .route(
            "/boards/{board_id}/columns",
            post(handlers::columns::create_column).get(handlers::columns::list_columns),
        )
        .route(
            "/columns/{column_id}",
            put(handlers::columns::update_column).delete(handlers::columns::delete_column),
        )
        // Card routes
        .route(
            "/columns/{column_id}/cards",
            post(handlers::cards::create_card),
        )
        .route(
            "/cards/{card_id}",
            get(handlers::cards::get_card)
                .put(handlers::cards::update_card)
                .delete(handlers::cards::delete_card),
        )
        .route("/cards/{card_id}/move", post(handlers::cards::move_card))
        .route(
            "/cards/{card_id}/assignees",
            put(handlers::cards::set_assignees),
        )
        .route("/cards/{card_id}/tags", put(handlers::cards::set_tags))
        // Tag routes
        .route(
            "/boards/{board_id}/tags",
            post(handlers::tags::create_tag).get(handlers::tags::list_tags),
        )
        .route(
            "/tags/{tag_id}",
            put(handlers::tags::update_tag).delete(handlers::tags::delete_tag),
        )
        // Comment routes
        .route(
            "/cards/{card_id}/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/comments/{comment_id}",
            put(handlers::comments::update_comment).delete(handlers::comments::delete_comment),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub mod test_utils {
    use crate::auth::{generate_token, hash_password, hash_token};
    use crate::config::Settings;
    use crate::models::User;
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use uuid::Uuid;

    pub const TEST_PASSWORD: &str = "testpassword123";

    pub async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool, Settings::default())
    }

    pub async fn create_test_user(state: &AppState, username: &str) -> User {
        let password_hash = hash_password(TEST_PASSWORD).unwrap();
        state
            .users
            .create(
                Uuid::new_v4(),
                username,
                &format!("{}@example.com", username),
                &password_hash,
            )
            .await
            .unwrap()
    }

    /// Returns the raw token; only its hash is stored.
    pub async fn create_test_session(state: &AppState, user_id: Uuid) -> String {
        let token = generate_token();
        state
            .sessions
            .create(user_id, &hash_token(&token), chrono::Duration::days(1))
            .await
            .unwrap();
        token
    }
}
