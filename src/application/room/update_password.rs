use std::sync::Arc;

use crate::domain::repositories::{RepositoryError, RoomRepository};
use crate::infrastructure::auth::PasswordService;

/// Update password input
pub struct UpdatePasswordInput {
    pub user_id: String,
    pub room_id: String,
    /// `None` or empty clears protection
    pub new_password: Option<String>,
}

/// Update room password use case
pub struct UpdatePassword<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> UpdatePassword<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: UpdatePasswordInput) -> Result<(), UpdatePasswordError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(UpdatePasswordError::RoomNotFound)?;

        if !room.can_manage(&input.user_id) {
            return Err(UpdatePasswordError::NotOwner);
        }

        let password_hash = input
            .new_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PasswordService::hash);

        self.room_repo
            .update_password(&input.room_id, password_hash)
            .await?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdatePasswordError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Only the room owner can change the password")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
