use std::sync::Arc;

use crate::domain::entities::Room;
use crate::domain::repositories::{RepositoryError, RoomRepository};

/// List rooms use case - newest first
pub struct ListRooms<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> ListRooms<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self) -> Result<Vec<Room>, ListRoomsError> {
        Ok(self.room_repo.list_all().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListRoomsError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
