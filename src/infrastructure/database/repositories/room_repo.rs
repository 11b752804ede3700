use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::{Room, RoomStatus};
use crate::domain::repositories::{RepositoryError, RoomRepository};
use crate::infrastructure::app_state::StoreChange;

/// SQLite implementation of RoomRepository.
///
/// Every successful mutation re-reads the room document and publishes it on
/// the store change feed, mirroring a document store that fans out full
/// snapshots to subscribers.
pub struct SqliteRoomRepository {
    pool: SqlitePool,
    changes: async_broadcast::Sender<StoreChange>,
}

impl SqliteRoomRepository {
    pub fn new(pool: SqlitePool, changes: async_broadcast::Sender<StoreChange>) -> Self {
        Self { pool, changes }
    }

    fn row_to_room(row: &sqlx::sqlite::SqliteRow) -> Room {
        use sqlx::Row;

        let status_str: String = row.get("status");

        // Legacy rows may predate ownership tracking and salting; every
        // optional column defaults rather than failing the read.
        Room {
            id: row.get("id"),
            name: row.get("name"),
            owner_id: row.get("owner_id"),
            password_hash: row.get("password_hash"),
            status: RoomStatus::from_str(&status_str).unwrap_or(RoomStatus::Active),
            created_at: row.get("created_at"),
            finished_at: row.get("finished_at"),
        }
    }

    async fn publish(&self, id: &str) {
        match self.find_by_id(id).await {
            Ok(room) => {
                let _ = self.changes.try_broadcast(StoreChange::Room {
                    room_id: id.to_string(),
                    room,
                });
            }
            Err(e) => tracing::warn!(room_id = id, "failed to publish room change: {e}"),
        }
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let count: i32 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_room))
    }

    async fn list_all(&self) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM rooms ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_room).collect())
    }

    async fn save(&self, room: &Room) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, name, owner_id, password_hash, status, created_at, finished_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                owner_id = excluded.owner_id,
                password_hash = excluded.password_hash,
                status = excluded.status,
                finished_at = excluded.finished_at
            "#,
        )
        .bind(&room.id)
        .bind(&room.name)
        .bind(&room.owner_id)
        .bind(&room.password_hash)
        .bind(room.status.as_str())
        .bind(room.created_at)
        .bind(room.finished_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.publish(&room.id).await;
        Ok(())
    }

    async fn set_status(&self, id: &str, status: RoomStatus) -> Result<(), RepositoryError> {
        let finished_at = match status {
            RoomStatus::Finished => Some(chrono::Utc::now().timestamp()),
            RoomStatus::Active => None,
        };

        let result = sqlx::query("UPDATE rooms SET status = ?, finished_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(finished_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("room {id}")));
        }

        self.publish(id).await;
        Ok(())
    }

    async fn update_password(
        &self,
        id: &str,
        password_hash: Option<String>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE rooms SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("room {id}")));
        }

        self.publish(id).await;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        // Subscribers see the document disappear
        let _ = self.changes.try_broadcast(StoreChange::Room {
            room_id: id.to_string(),
            room: None,
        });
        Ok(())
    }
}
