use async_trait::async_trait;

use crate::domain::entities::User;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Save user (create or update)
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    /// Delete user
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}
