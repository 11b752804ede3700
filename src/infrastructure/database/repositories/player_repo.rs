use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::Player;
use crate::domain::repositories::{PlayerRepository, RepositoryError};
use crate::infrastructure::app_state::StoreChange;

/// SQLite implementation of PlayerRepository.
///
/// Score increments happen in a single UPDATE against the stored value, never
/// as read-modify-write, so N concurrent +1s always land as +N. After each
/// mutation the full player list of the room is re-read and published as one
/// snapshot.
pub struct SqlitePlayerRepository {
    pool: SqlitePool,
    changes: async_broadcast::Sender<StoreChange>,
}

impl SqlitePlayerRepository {
    pub fn new(pool: SqlitePool, changes: async_broadcast::Sender<StoreChange>) -> Self {
        Self { pool, changes }
    }

    fn row_to_player(row: &sqlx::sqlite::SqliteRow) -> Player {
        use sqlx::Row;

        Player {
            id: row.get("id"),
            room_id: row.get("room_id"),
            name: row.get("name"),
            score: row.get::<i64, _>("score"),
            linked_user_id: row.get("linked_user_id"),
            avatar_url: row.get("avatar_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    async fn publish(&self, room_id: &str) {
        match self.list_by_room(room_id).await {
            Ok(players) => {
                let _ = self.changes.try_broadcast(StoreChange::Players {
                    room_id: room_id.to_string(),
                    players,
                });
            }
            Err(e) => tracing::warn!(room_id, "failed to publish player change: {e}"),
        }
    }
}

#[async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Player>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM players WHERE room_id = ? ORDER BY score DESC")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_player).collect())
    }

    async fn find_by_id(
        &self,
        room_id: &str,
        player_id: &str,
    ) -> Result<Option<Player>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM players WHERE room_id = ? AND id = ?")
            .bind(room_id)
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_player))
    }

    async fn find_by_linked_user(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<Player>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM players WHERE room_id = ? AND linked_user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_player))
    }

    async fn add(&self, player: &Player) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO players (id, room_id, name, score, linked_user_id, avatar_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&player.id)
        .bind(&player.room_id)
        .bind(&player.name)
        .bind(player.score)
        .bind(&player.linked_user_id)
        .bind(&player.avatar_url)
        .bind(player.created_at)
        .bind(player.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.publish(&player.room_id).await;
        Ok(())
    }

    async fn increment_score(
        &self,
        room_id: &str,
        player_id: &str,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE players SET score = score + ?, updated_at = ? WHERE room_id = ? AND id = ?",
        )
        .bind(delta)
        .bind(chrono::Utc::now().timestamp())
        .bind(room_id)
        .bind(player_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("player {player_id}")));
        }

        self.publish(room_id).await;
        Ok(())
    }

    async fn set_score(
        &self,
        room_id: &str,
        player_id: &str,
        score: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE players SET score = ?, updated_at = ? WHERE room_id = ? AND id = ?",
        )
        .bind(score)
        .bind(chrono::Utc::now().timestamp())
        .bind(room_id)
        .bind(player_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        // The target may have been deleted between the caller reading the
        // board and this write landing; that is a no-op, not a failure.
        if result.rows_affected() == 0 {
            tracing::warn!(room_id, player_id, "set_score target no longer exists");
            return Ok(());
        }

        self.publish(room_id).await;
        Ok(())
    }

    async fn rename(
        &self,
        room_id: &str,
        player_id: &str,
        new_name: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE players SET name = ?, updated_at = ? WHERE room_id = ? AND id = ?",
        )
        .bind(new_name.trim())
        .bind(chrono::Utc::now().timestamp())
        .bind(room_id)
        .bind(player_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::warn!(room_id, player_id, "rename target no longer exists");
            return Ok(());
        }

        self.publish(room_id).await;
        Ok(())
    }

    async fn remove(&self, room_id: &str, player_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM players WHERE room_id = ? AND id = ?")
            .bind(room_id)
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("player {player_id}")));
        }

        self.publish(room_id).await;
        Ok(())
    }

    async fn remove_all(&self, room_id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM players WHERE room_id = ?")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.publish(room_id).await;
        Ok(())
    }
}
