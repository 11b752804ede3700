use std::sync::Arc;

use futures::future::join_all;

use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};
use crate::infrastructure::services::{HistoryLog, SoundCue, SoundManager};

/// Reset scores input
pub struct ResetScoresInput {
    pub user_id: String,
    pub user_nickname: String,
    pub room_id: String,
    /// Ids captured from the caller's last-known board. A player added while
    /// the reset is in flight is not included; that race is part of the
    /// operation's contract.
    pub player_ids: Vec<String>,
}

/// Reset scores use case - zeroes the given players in parallel
pub struct ResetScores<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
}

impl<R: RoomRepository, P: PlayerRepository> ResetScores<R, P> {
    pub fn new(
        room_repo: Arc<R>,
        player_repo: Arc<P>,
        history: Arc<HistoryLog>,
        sounds: Arc<SoundManager>,
    ) -> Self {
        Self {
            room_repo,
            player_repo,
            history,
            sounds,
        }
    }

    pub async fn execute(&self, input: ResetScoresInput) -> Result<(), ResetScoresError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(ResetScoresError::RoomNotFound)?;

        if room.is_finished() {
            return Err(ResetScoresError::RoomFinished);
        }

        if !room.can_manage(&input.user_id) {
            return Err(ResetScoresError::NotOwner);
        }

        let writes = input
            .player_ids
            .iter()
            .map(|id| self.player_repo.set_score(&input.room_id, id, 0));
        for result in join_all(writes).await {
            // set_score already swallows vanished players; anything else is
            // a real store failure.
            result?;
        }

        self.history
            .log_scores_reset(&input.room_id, &input.user_id, &input.user_nickname);
        self.sounds.trigger(&input.room_id, SoundCue::lose());

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResetScoresError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is finished")]
    RoomFinished,
    #[error("Only the room owner can reset scores")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
