use std::sync::Arc;

use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};
use crate::infrastructure::services::{HistoryLog, SessionManager, SoundCue, SoundManager};

/// Change score input
pub struct ChangeScoreInput {
    pub user_id: String,
    pub room_id: String,
    pub player_id: String,
    /// Positive to add, negative to subtract
    pub delta: i64,
}

/// Change score use case.
///
/// The delta is applied atomically in the store; this layer never computes
/// the new score itself, so concurrent changes from several clients all
/// land.
pub struct ChangeScore<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    session_manager: Arc<SessionManager>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
}

impl<R: RoomRepository, P: PlayerRepository> ChangeScore<R, P> {
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

    pub async fn execute(&self, input: ChangeScoreInput) -> Result<(), ChangeScoreError> {
        if input.delta == 0 {
            return Err(ChangeScoreError::Validation("Delta must be non-zero".into()));
        }

        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(ChangeScoreError::RoomNotFound)?;

        if room.is_finished() {
            return Err(ChangeScoreError::RoomFinished);
        }

        if !self
            .session_manager
            .is_authenticated(&input.user_id, &input.room_id)
        {
            return Err(ChangeScoreError::NotAuthenticated);
        }

        let player = self
            .player_repo
            .find_by_id(&input.room_id, &input.player_id)
            .await?
            .ok_or(ChangeScoreError::PlayerNotFound)?;

        self.player_repo
            .increment_score(&input.room_id, &input.player_id, input.delta)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => ChangeScoreError::PlayerNotFound,
                other => ChangeScoreError::Repository(other),
            })?;

        self.history
            .log_score_change(&input.room_id, &player.id, &player.name, input.delta);
        let cue = if input.delta > 0 {
            SoundCue::coin()
        } else {
            SoundCue::lose()
        };
        self.sounds.trigger(&input.room_id, cue);

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChangeScoreError {
    #[error("Validation error: {0}")]
    Validation(String),
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
