use std::sync::Arc;

use crate::domain::entities::{Room, RoomStatus};
use crate::domain::repositories::{RepositoryError, RoomRepository};

/// Reopen room input
pub struct ReopenRoomInput {
    pub user_id: String,
    pub room_id: String,
}

/// Reopen room use case - clears the finished state and its timestamp
pub struct ReopenRoom<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> ReopenRoom<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: ReopenRoomInput) -> Result<Room, ReopenRoomError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(ReopenRoomError::RoomNotFound)?;

        if !room.can_manage(&input.user_id) {
            return Err(ReopenRoomError::NotOwner);
        }

        self.room_repo
            .set_status(&input.room_id, RoomStatus::Active)
            .await?;

        self.room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(ReopenRoomError::RoomNotFound)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReopenRoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Only the room owner can reopen the game")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
