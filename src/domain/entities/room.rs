use serde::{Deserialize, Serialize};

/// Room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Finished,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Active => "active",
            RoomStatus::Finished => "finished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RoomStatus::Active),
            "finished" => Some(RoomStatus::Finished),
            _ => None,
        }
    }
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub status: RoomStatus,
    pub created_at: i64,
    pub finished_at: Option<i64>,
}

impl Room {
    /// Create a new active room
    pub fn new(
        id: String,
        name: String,
        owner_id: Option<String>,
        password_hash: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            owner_id,
            password_hash,
            status: RoomStatus::Active,
            created_at: chrono::Utc::now().timestamp(),
            finished_at: None,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    pub fn is_finished(&self) -> bool {
        self.status == RoomStatus::Finished
    }

    /// Whether a user may run owner actions (finish, reopen, reset, password).
    /// Rooms created before ownership tracking have no owner and stay open to
    /// any signed-in visitor.
    pub fn can_manage(&self, user_id: &str) -> bool {
        match self.owner_id.as_deref() {
            Some(owner) => owner == user_id,
            None => true,
        }
    }

    /// Finish the room (board becomes read-only)
    pub fn finish(&mut self) {
        self.status = RoomStatus::Finished;
        self.finished_at = Some(chrono::Utc::now().timestamp());
    }

    /// Reopen a finished room
    pub fn reopen(&mut self) {
        self.status = RoomStatus::Active;
        self.finished_at = None;
    }
}

/// Generate a random 6-character room code.
/// The alphabet drops 0/O and 1/I because codes are read aloud and typed
/// from TV screens.
pub fn generate_room_code() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Normalize a user-entered room id.
///
/// A 6-character alphanumeric string is always treated as a generated code
/// and uppercased, whatever its origin. Anything else is treated as a custom
/// slug: lowercased, non `[a-z0-9-]` runs collapsed to a single dash, and
/// leading/trailing dashes trimmed.
pub fn normalize_room_id(input: &str) -> String {
    let trimmed = input.trim();

    if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return trimmed.to_ascii_uppercase();
    }

    let mut slug = String::with_capacity(trimmed.len());
    let mut last_dash = true; // suppress a leading dash
    for c in trimmed.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_alphabet() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), 6);
            assert!(code
                .chars()
                .all(|c| "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".contains(c)));
        }
    }

    #[test]
    fn test_six_char_input_is_always_a_code() {
        assert_eq!(normalize_room_id("abc123"), "ABC123");
        assert_eq!(normalize_room_id("AbC123"), "ABC123");
        assert_eq!(normalize_room_id(" XYZ789 "), "XYZ789");
    }

    #[test]
    fn test_custom_id_slugified() {
        assert_eq!(normalize_room_id("Poker Night!"), "poker-night");
        assert_eq!(normalize_room_id("--hello--world--"), "hello-world");
        assert_eq!(normalize_room_id("Família & Amigos"), "fam-lia-amigos");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["abc123", "Poker Night!", "  spaced out  ", "já-ok"] {
            let once = normalize_room_id(input);
            assert_eq!(normalize_room_id(&once), once);
        }
    }

    #[test]
    fn test_manage_rights() {
        let mut room = Room::new("ABC234".into(), "Test".into(), Some("u1".into()), None);
        assert!(room.can_manage("u1"));
        assert!(!room.can_manage("u2"));

        // Legacy room without owner tracking
        room.owner_id = None;
        assert!(room.can_manage("u2"));
    }

    #[test]
    fn test_finish_and_reopen() {
        let mut room = Room::new("ABC234".into(), "Test".into(), None, None);
        assert_eq!(room.status, RoomStatus::Active);

        room.finish();
        assert_eq!(room.status, RoomStatus::Finished);
        assert!(room.finished_at.is_some());

        room.reopen();
        assert_eq!(room.status, RoomStatus::Active);
        assert!(room.finished_at.is_none());
    }
}
