use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::infrastructure::app_state::RoomEvent;

/// Upper bound per room; older entries are silently dropped
const MAX_ENTRIES: usize = 50;

/// Notable board events, newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    ScoreUp,
    ScoreDown,
    PlayerAdded,
    PlayerRemoved,
    LeaderChange,
    ScoresReset,
    BoardCleared,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::ScoreUp => "score_up",
            HistoryAction::ScoreDown => "score_down",
            HistoryAction::PlayerAdded => "player_added",
            HistoryAction::PlayerRemoved => "player_removed",
            HistoryAction::LeaderChange => "leader_change",
            HistoryAction::ScoresReset => "scores_reset",
            HistoryAction::BoardCleared => "board_cleared",
        }
    }
}

/// History entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub action: HistoryAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Per-room history log.
///
/// A bounded, prepend-only buffer per room, held for the lifetime of the
/// service. Readers get point-in-time clones, so a UI can render a list
/// without seeing it mutate mid-read; live consumers get each entry on the
/// room event feed.
pub struct HistoryLog {
    rooms: RwLock<HashMap<String, Vec<HistoryEntry>>>,
    events: async_broadcast::Sender<RoomEvent>,
}

impl HistoryLog {
    pub fn new(events: async_broadcast::Sender<RoomEvent>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            events,
        }
    }

    fn append(
        &self,
        room_id: &str,
        player_id: &str,
        player_name: &str,
        action: HistoryAction,
        amount: Option<i64>,
        details: Option<String>,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            player_name: player_name.to_string(),
            action,
            amount,
            timestamp: chrono::Utc::now().timestamp_millis(),
            details,
        };

        {
            let mut rooms = self.rooms.write().unwrap();
            let entries = rooms.entry(room_id.to_string()).or_default();
            entries.insert(0, entry.clone());
            entries.truncate(MAX_ENTRIES);
        }

        let event = RoomEvent::new("historyAppended", room_id)
            .with_data(serde_json::json!({ "entry": entry }));
        let _ = self.events.try_broadcast(event);

        entry
    }

    pub fn log_score_change(&self, room_id: &str, player_id: &str, player_name: &str, delta: i64) {
        let action = if delta > 0 {
            HistoryAction::ScoreUp
        } else {
            HistoryAction::ScoreDown
        };
        let sign = if delta > 0 { "+" } else { "" };
        self.append(
            room_id,
            player_id,
            player_name,
            action,
            Some(delta.abs()),
            Some(format!("{sign}{delta} pts")),
        );
    }

    pub fn log_player_added(&self, room_id: &str, player_id: &str, player_name: &str) {
        self.append(
            room_id,
            player_id,
            player_name,
            HistoryAction::PlayerAdded,
            None,
            Some("joined the game".to_string()),
        );
    }

    pub fn log_player_removed(&self, room_id: &str, player_id: &str, player_name: &str) {
        self.append(
            room_id,
            player_id,
            player_name,
            HistoryAction::PlayerRemoved,
            None,
            Some("left the game".to_string()),
        );
    }

    pub fn log_leader_change(
        &self,
        room_id: &str,
        leader_id: &str,
        leader_name: &str,
        previous_leader_name: Option<&str>,
    ) {
        let details = match previous_leader_name {
            Some(prev) => format!("took the lead from {prev}"),
            None => "is the new leader!".to_string(),
        };
        self.append(
            room_id,
            leader_id,
            leader_name,
            HistoryAction::LeaderChange,
            None,
            Some(details),
        );
    }

    /// Board-level actions are attributed to the acting user rather than a
    /// player entry.
    pub fn log_scores_reset(&self, room_id: &str, actor_id: &str, actor_name: &str) {
        self.append(
            room_id,
            actor_id,
            actor_name,
            HistoryAction::ScoresReset,
            None,
            Some("reset all scores".to_string()),
        );
    }

    pub fn log_board_cleared(&self, room_id: &str, actor_id: &str, actor_name: &str) {
        self.append(
            room_id,
            actor_id,
            actor_name,
            HistoryAction::BoardCleared,
            None,
            Some("cleared the board".to_string()),
        );
    }

    /// Point-in-time snapshot of a room's history, newest first
    pub fn entries(&self, room_id: &str) -> Vec<HistoryEntry> {
        let rooms = self.rooms.read().unwrap();
        rooms.get(room_id).cloned().unwrap_or_default()
    }

    /// Empty one room's buffer
    pub fn clear(&self, room_id: &str) {
        let mut rooms = self.rooms.write().unwrap();
        rooms.remove(room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> HistoryLog {
        let (sender, _receiver) = async_broadcast::broadcast(16);
        HistoryLog::new(sender)
    }

    #[test]
    fn test_prepend_and_cap() {
        let history = log();
        for i in 0..60 {
            history.log_score_change("ABC234", "p1", "Ana", i + 1);
        }

        let entries = history.entries("ABC234");
        assert_eq!(entries.len(), MAX_ENTRIES);
        // Newest first
        assert_eq!(entries[0].amount, Some(60));
    }

    #[test]
    fn test_rooms_are_isolated() {
        let history = log();
        history.log_player_added("ABC234", "p1", "Ana");
        history.log_player_added("XYZ789", "p2", "Bia");

        assert_eq!(history.entries("ABC234").len(), 1);
        assert_eq!(history.entries("XYZ789").len(), 1);

        history.clear("ABC234");
        assert!(history.entries("ABC234").is_empty());
        assert_eq!(history.entries("XYZ789").len(), 1);
    }

    #[test]
    fn test_score_direction() {
        let history = log();
        history.log_score_change("ABC234", "p1", "Ana", 5);
        history.log_score_change("ABC234", "p1", "Ana", -2);

        let entries = history.entries("ABC234");
        assert_eq!(entries[0].action, HistoryAction::ScoreDown);
        assert_eq!(entries[0].amount, Some(2));
        assert_eq!(entries[1].action, HistoryAction::ScoreUp);
        assert_eq!(entries[1].amount, Some(5));
    }
}
