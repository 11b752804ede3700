mod player;
mod room;
mod user;

pub use player::*;
pub use room::*;
pub use user::*;
