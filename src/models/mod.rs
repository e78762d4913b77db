pub mod board;
pub mod card;
pub mod column;
pub mod comment;
pub mod relation;
pub mod tag;
pub mod user;

pub use board::*;
pub use card::*;
pub use column::*;
pub use comment::*;
pub use tag::*;
pub use user::*;
