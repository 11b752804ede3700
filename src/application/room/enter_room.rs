use std::sync::Arc;

use crate::domain::entities::{Player, RecentRoom, RecentRoomRole, Room, User};
use crate::domain::repositories::{
    PlayerRepository, RepositoryError, RoomRepository, UserRepository,
};
use crate::infrastructure::auth::PasswordService;
use crate::infrastructure::services::{HistoryLog, SessionManager, SoundCue, SoundManager};

/// Enter room input
pub struct EnterRoomInput {
    pub user_id: String,
    pub room_id: String,
    pub password: Option<String>,
}

/// Enter room output
pub struct EnterRoomOutput {
    pub room: Room,
    /// Finished rooms are visible but frozen
    pub read_only: bool,
    /// Whether owner actions are available to this visitor
    pub can_manage: bool,
    /// The visitor's player entry after auto-join, if the room is active
    pub player: Option<Player>,
}

/// Enter room use case - resolves a room visit.
///
/// Covers the whole entry sequence: existence, the password gate with its
/// auto-auth short-circuits (owner, just-created, no password), the
/// recent-rooms bookkeeping, and the once-per-visit auto-join of the
/// signed-in identity as a player.
pub struct EnterRoom<R: RoomRepository, P: PlayerRepository, U: UserRepository> {
    room_repo: Arc<R>,
    player_repo: Arc<P>,
    user_repo: Arc<U>,
    session_manager: Arc<SessionManager>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
}

impl<R: RoomRepository, P: PlayerRepository, U: UserRepository> EnterRoom<R, P, U> {
    pub fn new(
        room_repo: Arc<R>,
        player_repo: Arc<P>,
        user_repo: Arc<U>,
        session_manager: Arc<SessionManager>,
        history: Arc<HistoryLog>,
        sounds: Arc<SoundManager>,
    ) -> Self {
        Self {
            room_repo,
            player_repo,
            user_repo,
            session_manager,
            history,
            sounds,
        }
    }

    pub async fn execute(&self, input: EnterRoomInput) -> Result<EnterRoomOutput, EnterRoomError> {
        let room = self
            .room_repo
            .find_by_id(&input.room_id)
            .await?
            .ok_or(EnterRoomError::RoomNotFound)?;

        let user = self
            .user_repo
            .find_by_id(&input.user_id)
            .await?
            .ok_or(EnterRoomError::UserNotFound)?;

        self.session_manager.begin_visit(&input.user_id, &input.room_id);
        self.authenticate(&room, &user, input.password.as_deref())?;
        self.session_manager
            .mark_authenticated(&input.user_id, &input.room_id);

        let player = if room.is_finished() {
            // Read-only mode also freezes auto-join; the visitor may watch
            // without being written onto the board.
            self.player_repo
                .find_by_linked_user(&room.id, &input.user_id)
                .await?
        } else {
            self.auto_join(&room, &user).await?
        };

        self.record_recent(user, &room).await;

        let can_manage = room.can_manage(&input.user_id);
        Ok(EnterRoomOutput {
            read_only: room.is_finished(),
            can_manage,
            player,
            room,
        })
    }

    fn authenticate(
        &self,
        room: &Room,
        user: &User,
        password: Option<&str>,
    ) -> Result<(), EnterRoomError> {
        if !room.has_password()
            || room.owner_id.as_deref() == Some(user.id.as_str())
            || self.session_manager.is_authenticated(&user.id, &room.id)
        {
            return Ok(());
        }

        match password {
            None => Err(EnterRoomError::PasswordRequired),
            Some(candidate) => {
                if PasswordService::verify(room.password_hash.as_deref(), candidate) {
                    Ok(())
                } else {
                    Err(EnterRoomError::InvalidPassword)
                }
            }
        }
    }

    /// Add the identity as a player exactly once per visit. A player linked
    /// to this identity that already exists is renamed (best-effort) when the
    /// nickname changed elsewhere since.
    async fn auto_join(&self, room: &Room, user: &User) -> Result<Option<Player>, EnterRoomError> {
        let existing = self
            .player_repo
            .find_by_linked_user(&room.id, &user.id)
            .await?;

        match existing {
            // The nickname sync runs on every entry; only the add itself is
            // guarded by the visit flag.
            Some(mut player) => {
                if player.name != user.nickname {
                    self.player_repo
                        .rename(&room.id, &player.id, &user.nickname)
                        .await?;
                    player.name = user.nickname.clone();
                }
                Ok(Some(player))
            }
            None if !self.session_manager.claim_auto_add(&user.id, &room.id) => Ok(None),
            None => {
                let player = Player::new(
                    uuid::Uuid::new_v4().to_string(),
                    room.id.clone(),
                    user.nickname.clone(),
                    Some(user.id.clone()),
                    user.avatar_url.clone(),
                );
                self.player_repo.add(&player).await?;

                self.history
                    .log_player_added(&room.id, &player.id, &player.name);
                self.sounds.trigger(&room.id, SoundCue::new_player());

                Ok(Some(player))
            }
        }
    }

    async fn record_recent(&self, mut user: User, room: &Room) {
        let role = if room.owner_id.as_deref() == Some(user.id.as_str()) {
            RecentRoomRole::Owner
        } else {
            RecentRoomRole::Player
        };
        user.record_recent_room(RecentRoom {
            room_id: room.id.clone(),
            name: room.name.clone(),
            role,
            has_password: room.has_password(),
            last_access: chrono::Utc::now().timestamp(),
        });

        if let Err(e) = self.user_repo.save(&user).await {
            tracing::warn!(user_id = %user.id, room_id = %room.id, "failed to record recent room: {e}");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnterRoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Room requires a password")]
    PasswordRequired,
    #[error("Incorrect password")]
    InvalidPassword,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
