use serde::{Deserialize, Serialize};

/// Upper bound on the recent-rooms list
pub const MAX_RECENT_ROOMS: usize = 20;

/// Role the user had in a visited room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentRoomRole {
    Owner,
    Player,
}

impl RecentRoomRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecentRoomRole::Owner => "owner",
            RecentRoomRole::Player => "player",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(RecentRoomRole::Owner),
            "player" => Some(RecentRoomRole::Player),
            _ => None,
        }
    }
}

/// A previously visited room, kept on the user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRoom {
    pub room_id: String,
    pub name: String,
    pub role: RecentRoomRole,
    #[serde(default)]
    pub has_password: bool,
    pub last_access: i64,
}

/// User entity - profile synced from the identity provider.
///
/// `nickname` starts as the provider display name but is user-owned after
/// that: profile syncs on later sign-ins must never overwrite it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub recent_rooms: Vec<RecentRoom>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Create a new user from identity-provider profile data
    pub fn new(id: String, email: String, display_name: String, avatar_url: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id,
            email,
            nickname: display_name.clone(),
            display_name,
            avatar_url,
            recent_rooms: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a room visit: dedup by room id, newest first, bounded list
    pub fn record_recent_room(&mut self, room: RecentRoom) {
        self.recent_rooms.retain(|r| r.room_id != room.room_id);
        self.recent_rooms.insert(0, room);
        self.recent_rooms.truncate(MAX_RECENT_ROOMS);
        self.updated_at = chrono::Utc::now().timestamp();
    }

    pub fn remove_recent_room(&mut self, room_id: &str) -> bool {
        let before = self.recent_rooms.len();
        self.recent_rooms.retain(|r| r.room_id != room_id);
        self.recent_rooms.len() != before
    }

    pub fn clear_recent_rooms(&mut self) {
        self.recent_rooms.clear();
        self.updated_at = chrono::Utc::now().timestamp();
    }
}
