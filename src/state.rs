use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Settings;
use crate::repo::{
    BoardRepository, CardRepository, ColumnRepository, CommentRepository, SessionRepository,
    TagRepository, UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub sessions: SessionRepository,
    pub boards: BoardRepository,
    pub columns: ColumnRepository,
    pub cards: CardRepository,
    pub tags: TagRepository,
    pub comments: CommentRepository,
    pub settings: Arc<Settings>,
    pub pool: Arc<SqlitePool>,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        let pool = Arc::new(pool);
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            boards: BoardRepository::new(pool.clone()),
            columns: ColumnRepository::new(pool.clone()),
            cards: CardRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            settings: Arc::new(settings),
            pool,
        }
    }
}
