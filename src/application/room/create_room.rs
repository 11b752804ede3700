use std::sync::Arc;

use crate::domain::entities::{generate_room_code, normalize_room_id, RecentRoom, RecentRoomRole, Room};
use crate::domain::repositories::{RepositoryError, RoomRepository, UserRepository};
use crate::infrastructure::auth::PasswordService;
use crate::infrastructure::services::SessionManager;

/// Collision retries for generated codes. The 32^6 space makes collisions
/// astronomically unlikely, so hitting this cap means the store is lying to
/// us and we bail out instead of spinning.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Create room input
pub struct CreateRoomInput {
    /// The signed-in creator; rooms created without identity have no owner
    pub owner_id: Option<String>,
    pub name: String,
    pub custom_id: Option<String>,
    pub password: Option<String>,
}

/// Create room output
pub struct CreateRoomOutput {
    pub room: Room,
}

/// Create room use case
pub struct CreateRoom<R: RoomRepository, U: UserRepository> {
    room_repo: Arc<R>,
    user_repo: Arc<U>,
    session_manager: Arc<SessionManager>,
}

impl<R: RoomRepository, U: UserRepository> CreateRoom<R, U> {
    pub fn new(room_repo: Arc<R>, user_repo: Arc<U>, session_manager: Arc<SessionManager>) -> Self {
        Self {
            room_repo,
            user_repo,
            session_manager,
        }
    }

    pub async fn execute(&self, input: CreateRoomInput) -> Result<CreateRoomOutput, CreateRoomError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CreateRoomError::Validation("Room name is required".into()));
        }

        let room_id = match &input.custom_id {
            Some(custom) => {
                let id = normalize_room_id(custom);
                if id.is_empty() {
                    return Err(CreateRoomError::Validation(
                        "Room code must contain letters or digits".into(),
                    ));
                }
                if self.room_repo.exists(&id).await? {
                    return Err(CreateRoomError::CodeTaken);
                }
                id
            }
            None => self.allocate_code().await?,
        };

        let password_hash = input
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PasswordService::hash);

        let room = Room::new(room_id.clone(), name, input.owner_id.clone(), password_hash);
        self.room_repo.save(&room).await?;

        if let Some(owner_id) = &input.owner_id {
            // The creator skips the password prompt on the navigation that
            // follows, and the room lands on top of their recent list.
            self.session_manager.mark_created(owner_id, &room_id);
            self.record_recent(owner_id, &room).await;
        }

        Ok(CreateRoomOutput { room })
    }

    async fn allocate_code(&self) -> Result<String, CreateRoomError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code();
            if !self.room_repo.exists(&code).await? {
                return Ok(code);
            }
        }
        Err(CreateRoomError::CodeAllocation)
    }

    async fn record_recent(&self, owner_id: &str, room: &Room) {
        let result = async {
            let Some(mut user) = self.user_repo.find_by_id(owner_id).await? else {
                return Ok(());
            };
            user.record_recent_room(RecentRoom {
                room_id: room.id.clone(),
                name: room.name.clone(),
                role: RecentRoomRole::Owner,
                has_password: room.has_password(),
                last_access: chrono::Utc::now().timestamp(),
            });
            self.user_repo.save(&user).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(owner_id, room_id = %room.id, "failed to record recent room: {e}");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateRoomError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Room code already in use")]
    CodeTaken,
    #[error("Could not allocate an unused room code")]
    CodeAllocation,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
