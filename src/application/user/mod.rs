mod update_nickname;

pub use update_nickname::*;
