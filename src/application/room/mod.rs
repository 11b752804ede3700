mod create_room;
mod delete_room;
mod enter_room;
mod finish_room;
mod list_rooms;
mod reopen_room;
mod update_password;

pub use create_room::*;
pub use delete_room::*;
pub use enter_room::*;
pub use finish_room::*;
pub use list_rooms::*;
pub use reopen_room::*;
pub use update_password::*;
