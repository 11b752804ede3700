use serde::{Deserialize, Serialize};

/// Player entity - a score-tracking entry within a room.
///
/// `linked_user_id` ties a player to a signed-in identity; guests added by
/// hand have no link and may share a name with other entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub score: i64,
    pub linked_user_id: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Player {
    /// Create a new player with a zero score
    pub fn new(
        id: String,
        room_id: String,
        name: String,
        linked_user_id: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id,
            room_id,
            name: name.trim().to_string(),
            score: 0,
            linked_user_id,
            avatar_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_linked_to(&self, user_id: &str) -> bool {
        self.linked_user_id.as_deref() == Some(user_id)
    }
}
