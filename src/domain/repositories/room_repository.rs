use async_trait::async_trait;

use crate::domain::entities::{Room, RoomStatus};
use crate::domain::repositories::RepositoryError;

/// Room repository trait.
///
/// Implementations publish a full room snapshot to the store change feed
/// after every successful mutation, so subscribers always receive resolved
/// documents rather than diffs.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Check whether a room id is taken
    async fn exists(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Find room by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, RepositoryError>;

    /// List all rooms, newest first
    async fn list_all(&self) -> Result<Vec<Room>, RepositoryError>;

    /// Save room (create or update)
    async fn save(&self, room: &Room) -> Result<(), RepositoryError>;

    /// Toggle lifecycle status; finishing stamps `finished_at`, reopening
    /// clears it
    async fn set_status(&self, id: &str, status: RoomStatus) -> Result<(), RepositoryError>;

    /// Replace the stored password hash (`None` clears protection)
    async fn update_password(&self, id: &str, password_hash: Option<String>)
        -> Result<(), RepositoryError>;

    /// Delete the room record. Callers must cascade player deletion first.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}
