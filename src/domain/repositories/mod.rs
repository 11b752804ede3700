mod player_repository;
mod room_repository;
mod user_repository;

pub use player_repository::*;
pub use room_repository::*;
pub use user_repository::*;
