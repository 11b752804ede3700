use std::sync::Arc;

use crate::domain::entities::Player;
use crate::domain::repositories::{PlayerRepository, RepositoryError, RoomRepository};
use crate::infrastructure::services::{HistoryLog, SessionManager, SoundCue, SoundManager};

/// Add player input
pub struct AddPlayerInput {
    pub user_id: String,
    pub room_id: String,
    pub name: String,
    /// Present for auto-joined identities, absent for guests
    pub linked_user_id: Option<String>,
    pub avatar_url: Option<String>,
}

/// Add player use case - guests start at zero
pub struct AddPlayer<R: RoomRepository, P: PlayerRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    session_manager: Arc<SessionManager>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
}

impl<R: RoomRepository, P: PlayerRepository> AddPlayer<R, P> {
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

    pub async fn execute(&self, input: AddPlayerInput) -> Result<Player, AddPlayerError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(AddPlayerError::RoomNotFound)?;

        if room.is_finished() {
            return Err(AddPlayerError::RoomFinished);
        }

        if !self
            .session_manager
            .is_authenticated(&input.user_id, &input.room_id)
        {
            return Err(AddPlayerError::NotAuthenticated);
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AddPlayerError::Validation("Player name is required".into()));
        }

        // One player per linked identity; guests may repeat names freely.
        if let Some(linked) = &input.linked_user_id {
            if self
                .player_repo
                .find_by_linked_user(&input.room_id, linked)
                .await?
                .is_some()
            {
                return Err(AddPlayerError::AlreadyJoined);
            }
        }

        let player = Player::new(
            uuid::Uuid::new_v4().to_string(),
            input.room_id.clone(),
            name,
            input.linked_user_id,
            input.avatar_url,
        );
        self.player_repo.add(&player).await?;

        self.history
            .log_player_added(&input.room_id, &player.id, &player.name);
        self.sounds.trigger(&input.room_id, SoundCue::new_player());

        Ok(player)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddPlayerError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is finished")]
    RoomFinished,
    #[error("Not authenticated for this room")]
    NotAuthenticated,
    #[error("Identity already has a player in this room")]
    AlreadyJoined,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
