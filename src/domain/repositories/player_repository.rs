use async_trait::async_trait;

use crate::domain::entities::Player;
use crate::domain::repositories::RepositoryError;

/// Player repository trait.
///
/// Score changes go through `increment_score` (a single atomic update in the
/// store) or `set_score` (absolute); nothing here reads a score and writes it
/// back, so concurrent increments never lose updates.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Players of a room, score descending (ties left to the caller)
    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Player>, RepositoryError>;

    /// Find a single player
    async fn find_by_id(&self, room_id: &str, player_id: &str)
        -> Result<Option<Player>, RepositoryError>;

    /// Find the player linked to a signed-in identity, if any
    async fn find_by_linked_user(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<Player>, RepositoryError>;

    /// Add a player with an initial score of zero, returning its id
    async fn add(&self, player: &Player) -> Result<(), RepositoryError>;

    /// Atomically add `delta` to the player's score
    async fn increment_score(
        &self,
        room_id: &str,
        player_id: &str,
        delta: i64,
    ) -> Result<(), RepositoryError>;

    /// Set an absolute score. A concurrently deleted player is a no-op, not
    /// an error.
    async fn set_score(
        &self,
        room_id: &str,
        player_id: &str,
        score: i64,
    ) -> Result<(), RepositoryError>;

    /// Rename a player. A concurrently deleted player is a no-op.
    async fn rename(
        &self,
        room_id: &str,
        player_id: &str,
        new_name: &str,
    ) -> Result<(), RepositoryError>;

    /// Remove a player
    async fn remove(&self, room_id: &str, player_id: &str) -> Result<(), RepositoryError>;

    /// Delete every player of a room (cascade path for room deletion)
    async fn remove_all(&self, room_id: &str) -> Result<(), RepositoryError>;
}
