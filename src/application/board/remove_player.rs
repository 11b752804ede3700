use std::sync::Arc;

use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};
use crate::infrastructure::services::{HistoryLog, SessionManager, SoundCue, SoundManager};

/// Remove player input
pub struct RemovePlayerInput {
    pub user_id: String,
    pub room_id: String,
    pub player_id: String,
}

/// Remove player use case
pub struct RemovePlayer<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    session_manager: Arc<SessionManager>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
}

impl<R: RoomRepository, P: PlayerRepository> RemovePlayer<R, P> {
    pub fn new(
        room_repo: Arc<R>,
        player_repo: Arc<P>,
        session_manager: Arc<SessionManager>,
        history: Arc<HistoryLog>,
        sounds: Arc<SoundManager>,
    ) -> Self {
        Self {
            room_repo,
            player_repo,
            session_manager,
            history,
            sounds,
        }
    }

    pub async fn execute(&self, input: RemovePlayerInput) -> Result<(), RemovePlayerError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(RemovePlayerError::RoomNotFound)?;

        if room.is_finished() {
            return Err(RemovePlayerError::RoomFinished);
        }

        if !self
            .session_manager
            .is_authenticated(&input.user_id, &input.room_id)
        {
            return Err(RemovePlayerError::NotAuthenticated);
        }

        let player = self
            .player_repo
            .find_by_id(&input.room_id, &input.player_id)
            .await?
            .ok_or(RemovePlayerError::PlayerNotFound)?;

        self.player_repo
            .remove(&input.room_id, &input.player_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => RemovePlayerError::PlayerNotFound,
                other => RemovePlayerError::Repository(other),
            })?;

        self.history
            .log_player_removed(&input.room_id, &player.id, &player.name);
        self.sounds.trigger(&input.room_id, SoundCue::delete());

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemovePlayerError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is finished")]
    RoomFinished,
    #[error("Not authenticated for this room")]
    NotAuthenticated,
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
