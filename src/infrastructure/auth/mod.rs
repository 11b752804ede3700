mod google;
mod jwt_service;
mod password;

pub use google::*;
pub use jwt_service::*;
pub use password::*;
