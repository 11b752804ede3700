use std::sync::Arc;

use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};
use crate::infrastructure::services::SessionManager;

/// Rename player input
pub struct RenamePlayerInput {
    pub user_id: String,
    pub room_id: String,
    pub player_id: String,
    pub new_name: String,
}

/// Rename player use case.
///
/// Best-effort: a player deleted while the rename is in flight makes this a
/// quiet no-op, not an error.
pub struct RenamePlayer<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    session_manager: Arc<SessionManager>,
}

impl<R: RoomRepository, P: PlayerRepository> RenamePlayer<R, P> {
    pub fn new(
        room_repo: Arc<R>,
        player_repo: Arc<P>,
        session_manager: Arc<SessionManager>,
    ) -> Self {
        Self {
            room_repo,
            player_repo,
            session_manager,
        }
    }

    pub async fn execute(&self, input: RenamePlayerInput) -> Result<(), RenamePlayerError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(RenamePlayerError::RoomNotFound)?;

        if room.is_finished() {
            return Err(RenamePlayerError::RoomFinished);
        }

        if !self
            .session_manager
            .is_authenticated(&input.user_id, &input.room_id)
        {
            return Err(RenamePlayerError::NotAuthenticated);
        }

        let new_name = input.new_name.trim().to_string();
        if new_name.is_empty() {
            return Err(RenamePlayerError::Validation("Name is required".into()));
        }

        self.player_repo
            .rename(&input.room_id, &input.player_id, &new_name)
            .await?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenamePlayerError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is finished")]
    RoomFinished,
    #[error("Not authenticated for this room")]
    NotAuthenticated,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
