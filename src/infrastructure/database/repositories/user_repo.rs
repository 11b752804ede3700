use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::User;
use crate::domain::repositories::{RepositoryError, UserRepository};

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
        use sqlx::Row;

        let display_name: String = row.get("display_name");
        let nickname: Option<String> = row.get("nickname");
        let recent_rooms_json: Option<String> = row.get("recent_rooms_json");

        User {
            id: row.get("id"),
            email: row.get("email"),
            // Profiles written before nicknames existed fall back to the
            // provider display name
            nickname: nickname.unwrap_or_else(|| display_name.clone()),
            display_name,
            avatar_url: row.get("avatar_url"),
            recent_rooms: recent_rooms_json
                .as_deref()
                .and_then(|json| serde_json::from_str(json).ok())
                .unwrap_or_default(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        let recent_rooms_json = serde_json::to_string(&user.recent_rooms)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, nickname, avatar_url, recent_rooms_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                display_name = excluded.display_name,
                nickname = excluded.nickname,
                avatar_url = excluded.avatar_url,
                recent_rooms_json = excluded.recent_rooms_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.nickname)
        .bind(&user.avatar_url)
        .bind(&recent_rooms_json)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }
}
