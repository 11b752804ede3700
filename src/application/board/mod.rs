mod add_player;
mod change_score;
mod clear_board;
mod remove_player;
mod rename_player;
mod reset_scores;

pub use add_player::*;
pub use change_score::*;
pub use clear_board::*;
pub use remove_player::*;
pub use rename_player::*;
pub use reset_scores::*;
