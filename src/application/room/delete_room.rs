use std::sync::Arc;

use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};

/// Delete room input
pub struct DeleteRoomInput {
    pub user_id: String,
    pub room_id: String,
}

/// Delete room use case.
///
/// The room owns its players, so deletion cascades: players first, then the
/// room record.
pub struct DeleteRoom<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
}

impl<R: RoomRepository, P: PlayerRepository> DeleteRoom<R, P> {
    pub fn new(room_repo: Arc<R>, player_repo: Arc<P>) -> Self {
        Self {
            room_repo,
            player_repo,
        }
    }

    pub async fn execute(&self, input: DeleteRoomInput) -> Result<(), DeleteRoomError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(DeleteRoomError::RoomNotFound)?;

        if !room.can_manage(&input.user_id) {
            return Err(DeleteRoomError::NotOwner);
        }

        self.player_repo.remove_all(&input.room_id).await?;
        self.room_repo.delete(&input.room_id).await?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteRoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Only the room owner can delete the room")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
