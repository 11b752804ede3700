use std::sync::Arc;

use futures::future::join_all;

use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};
use crate::infrastructure::services::{HistoryLog, SoundCue, SoundManager};

/// Clear board input
pub struct ClearBoardInput {
    pub user_id: String,
    pub user_nickname: String,
    pub room_id: String,
    /// When set, the player linked to this identity survives the wipe. Lets
    /// an owner empty the room while staying on the board.
    pub exclude_user_id: Option<String>,
}

/// Clear board use case - removes every player, minus the optional survivor
pub struct ClearBoard<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
}

impl<R: RoomRepository, P: PlayerRepository> ClearBoard<R, P> {
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

    pub async fn execute(&self, input: ClearBoardInput) -> Result<(), ClearBoardError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(ClearBoardError::RoomNotFound)?;

        if room.is_finished() {
            return Err(ClearBoardError::RoomFinished);
        }

        if !room.can_manage(&input.user_id) {
            return Err(ClearBoardError::NotOwner);
        }

        let players = self.player_repo.list_by_room(&input.room_id).await?;
        let doomed: Vec<_> = players
            .iter()
            .filter(|p| match &input.exclude_user_id {
                Some(keep) => !p.is_linked_to(keep),
                None => true,
            })
            .collect();

        let removals = doomed
            .iter()
            .map(|p| self.player_repo.remove(&input.room_id, &p.id));
        for result in join_all(removals).await {
            match result {
                // Someone else removed the player first; the board still
                // ends up empty, which is all that matters here.
                Err(RepositoryError::NotFound(_)) | Ok(()) => {}
                Err(other) => return Err(other.into()),
            }
        }

        self.history
            .log_board_cleared(&input.room_id, &input.user_id, &input.user_nickname);
        self.sounds.trigger(&input.room_id, SoundCue::delete());

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClearBoardError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is finished")]
    RoomFinished,
    #[error("Only the room owner can clear the board")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
