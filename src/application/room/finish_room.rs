use std::sync::Arc;

use crate::domain::entities::{Room, RoomStatus};
use crate::domain::repositories::{RepositoryError, RoomRepository};

/// Finish room input
pub struct FinishRoomInput {
    pub user_id: String,
    pub room_id: String,
}

/// Finish room use case - freezes the board into read-only mode
pub struct FinishRoom<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> FinishRoom<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: FinishRoomInput) -> Result<Room, FinishRoomError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(FinishRoomError::RoomNotFound)?;

        if !room.can_manage(&input.user_id) {
            return Err(FinishRoomError::NotOwner);
        }

        self.room_repo
            .set_status(&input.room_id, RoomStatus::Finished)
            .await?;

        self.room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(FinishRoomError::RoomNotFound)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FinishRoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Only the room owner can finish the game")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
