pub mod board;
pub mod card;
pub mod column;
pub mod comment;
pub mod session;
pub mod tag;
pub mod user;

pub use board::BoardRepository;
pub use card::CardRepository;
pub use column::ColumnRepository;
pub use comment::CommentRepository;
pub use session::SessionRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
