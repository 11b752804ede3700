use std::collections::HashMap;
use std::sync::RwLock;

/// A user's visit to a room.
///
/// The flags here are the idempotency guards for a visit: `authenticated`
/// gates password-protected rooms, `auto_added` makes auto-join fire at most
/// once per visit, and `just_created` lets the creator skip the password
/// prompt on the navigation right after creating the room. All of it is
/// scoped to the (user, room) pair and dropped when the visit ends, so
/// switching rooms naturally resets the guards.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomVisit {
    pub user_id: String,
    pub room_id: String,
    pub authenticated: bool,
    pub auto_added: bool,
    pub just_created: bool,
    pub started_at: i64,
}

/// Session manager for tracking active room visits
pub struct SessionManager {
    visits: RwLock<HashMap<(String, String), RoomVisit>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            visits: RwLock::new(HashMap::new()),
        }
    }

    fn key(user_id: &str, room_id: &str) -> (String, String) {
        (user_id.to_string(), room_id.to_string())
    }

    /// Start (or fetch) a visit for a user entering a room
    pub fn begin_visit(&self, user_id: &str, room_id: &str) -> RoomVisit {
        let mut visits = self.visits.write().unwrap();
        visits
            .entry(Self::key(user_id, room_id))
            .or_insert_with(|| RoomVisit {
                user_id: user_id.to_string(),
                room_id: room_id.to_string(),
                authenticated: false,
                auto_added: false,
                just_created: false,
                started_at: chrono::Utc::now().timestamp(),
            })
            .clone()
    }

    /// Mark the creator's visit so the password prompt is skipped once
    pub fn mark_created(&self, user_id: &str, room_id: &str) {
        let mut visits = self.visits.write().unwrap();
        let visit = visits
            .entry(Self::key(user_id, room_id))
            .or_insert_with(|| RoomVisit {
                user_id: user_id.to_string(),
                room_id: room_id.to_string(),
                authenticated: false,
                auto_added: false,
                just_created: false,
                started_at: chrono::Utc::now().timestamp(),
            });
        visit.just_created = true;
        visit.authenticated = true;
    }

    pub fn mark_authenticated(&self, user_id: &str, room_id: &str) {
        let mut visits = self.visits.write().unwrap();
        if let Some(visit) = visits.get_mut(&Self::key(user_id, room_id)) {
            visit.authenticated = true;
        }
    }

    pub fn is_authenticated(&self, user_id: &str, room_id: &str) -> bool {
        let visits = self.visits.read().unwrap();
        visits
            .get(&Self::key(user_id, room_id))
            .is_some_and(|v| v.authenticated)
    }

    pub fn was_just_created(&self, user_id: &str, room_id: &str) -> bool {
        let visits = self.visits.read().unwrap();
        visits
            .get(&Self::key(user_id, room_id))
            .is_some_and(|v| v.just_created)
    }

    /// Claim the auto-join slot for this visit. Returns false when auto-join
    /// already ran, which is what keeps re-entrant calls from adding the same
    /// identity twice.
    pub fn claim_auto_add(&self, user_id: &str, room_id: &str) -> bool {
        let mut visits = self.visits.write().unwrap();
        match visits.get_mut(&Self::key(user_id, room_id)) {
            Some(visit) if visit.auto_added => false,
            Some(visit) => {
                visit.auto_added = true;
                true
            }
            None => false,
        }
    }

    /// Drop a visit (navigation away or kick)
    pub fn end_visit(&self, user_id: &str, room_id: &str) {
        let mut visits = self.visits.write().unwrap();
        visits.remove(&Self::key(user_id, room_id));
    }

    /// Drop every visit of a room (room deletion)
    pub fn end_room_visits(&self, room_id: &str) {
        let mut visits = self.visits.write().unwrap();
        visits.retain(|(_, rid), _| rid != room_id);
    }

    /// Count active visits for a room
    pub fn room_visit_count(&self, room_id: &str) -> usize {
        let visits = self.visits.read().unwrap();
        visits.keys().filter(|(_, rid)| rid == room_id).count()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_add_claimed_once() {
        let manager = SessionManager::new();
        manager.begin_visit("u1", "ABC234");

        assert!(manager.claim_auto_add("u1", "ABC234"));
        assert!(!manager.claim_auto_add("u1", "ABC234"));
    }

    #[test]
    fn test_room_change_resets_guards() {
        let manager = SessionManager::new();
        manager.begin_visit("u1", "ABC234");
        assert!(manager.claim_auto_add("u1", "ABC234"));

        // Leaving and coming back is a new visit
        manager.end_visit("u1", "ABC234");
        manager.begin_visit("u1", "ABC234");
        assert!(manager.claim_auto_add("u1", "ABC234"));
    }

    #[test]
    fn test_created_room_skips_password() {
        let manager = SessionManager::new();
        manager.mark_created("u1", "ABC234");

        assert!(manager.was_just_created("u1", "ABC234"));
        assert!(manager.is_authenticated("u1", "ABC234"));
        assert!(!manager.is_authenticated("u2", "ABC234"));
    }
}
