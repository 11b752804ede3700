use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::Player;
use crate::domain::services::leaderboard;
use crate::infrastructure::app_state::RoomEvent;
use crate::infrastructure::services::{HistoryLog, SoundCue, SoundManager};

/// Per-room reconciliation state
struct BoardState {
    previous_leader_id: Option<String>,
    previous_leader_name: Option<String>,
    seen_first_snapshot: bool,
}

/// Scoreboard reconciler.
///
/// Consumes raw player snapshots from the store feed and turns them into the
/// board every subscriber sees: deterministically sorted, with leader
/// transitions detected exactly once per real change. The first snapshot of a
/// room never fires the leader side effects; afterwards a transition fires
/// only when the new head's score is strictly positive, so a zero-reset never
/// celebrates.
pub struct Scoreboard {
    rooms: RwLock<HashMap<String, BoardState>>,
    history: Arc<HistoryLog>,
    sounds: Arc<SoundManager>,
    events: async_broadcast::Sender<RoomEvent>,
}

impl Scoreboard {
    pub fn new(
        history: Arc<HistoryLog>,
        sounds: Arc<SoundManager>,
        events: async_broadcast::Sender<RoomEvent>,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            history,
            sounds,
            events,
        }
    }

    /// Reconcile one snapshot and publish the resulting board
    pub fn apply_players_snapshot(&self, room_id: &str, mut players: Vec<Player>) {
        leaderboard::sort_players(&mut players);

        let transition = {
            let mut rooms = self.rooms.write().unwrap();
            let state = rooms.entry(room_id.to_string()).or_insert(BoardState {
                previous_leader_id: None,
                previous_leader_name: None,
                seen_first_snapshot: false,
            });

            let transition = leaderboard::detect_leader_change(
                &players,
                state.previous_leader_id.as_deref(),
                !state.seen_first_snapshot,
            )
            .map(|t| (t, state.previous_leader_name.clone()));

            // The tracked leader follows the head unconditionally, even when
            // the transition itself is suppressed (initial load, zero score).
            state.previous_leader_id = leaderboard::leader_id(&players).map(str::to_string);
            state.previous_leader_name = players.first().map(|p| p.name.clone());
            state.seen_first_snapshot = true;

            transition
        };

        if let Some((transition, previous_name)) = transition {
            tracing::debug!(
                room_id,
                leader = %transition.new_leader_name,
                "leader changed"
            );
            self.history.log_leader_change(
                room_id,
                &transition.new_leader_id,
                &transition.new_leader_name,
                previous_name.as_deref(),
            );
            self.sounds.trigger(room_id, SoundCue::fanfare());
        }

        let event = RoomEvent::new("boardUpdated", room_id)
            .with_data(serde_json::json!({ "players": players }));
        let _ = self.events.try_broadcast(event);
    }

    /// Current sorted board for a fresh subscriber (initial snapshot)
    pub fn sorted(&self, mut players: Vec<Player>) -> Vec<Player> {
        leaderboard::sort_players(&mut players);
        players
    }

    /// Drop a room's reconciliation state. The next snapshot after this is
    /// treated as an initial load again.
    pub fn forget_room(&self, room_id: &str) {
        let mut rooms = self.rooms.write().unwrap();
        rooms.remove(room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str, score: i64) -> Player {
        let mut p = Player::new(
            id.to_string(),
            "ABC234".to_string(),
            name.to_string(),
            None,
            None,
        );
        p.score = score;
        p
    }

    fn scoreboard() -> (Scoreboard, Arc<HistoryLog>) {
        let (sender, _receiver) = async_broadcast::broadcast(64);
        let history = Arc::new(HistoryLog::new(sender.clone()));
        let sounds = Arc::new(SoundManager::new(sender.clone()));
        (
            Scoreboard::new(history.clone(), sounds, sender),
            history,
        )
    }

    #[test]
    fn test_initial_snapshot_fires_nothing() {
        let (board, history) = scoreboard();
        board.apply_players_snapshot("ABC234", vec![player("p1", "Ana", 10)]);
        assert!(history.entries("ABC234").is_empty());
    }

    #[test]
    fn test_transition_fires_exactly_once() {
        let (board, history) = scoreboard();
        board.apply_players_snapshot("ABC234", vec![player("p1", "Ana", 3)]);
        board.apply_players_snapshot(
            "ABC234",
            vec![player("p1", "Ana", 3), player("p2", "Bia", 5)],
        );
        // Same leader again: no second entry
        board.apply_players_snapshot(
            "ABC234",
            vec![player("p1", "Ana", 4), player("p2", "Bia", 5)],
        );

        let entries = history.entries("ABC234");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_name, "Bia");
        assert_eq!(entries[0].details.as_deref(), Some("took the lead from Ana"));
    }

    #[test]
    fn test_reset_to_zero_is_silent_but_tracked() {
        let (board, history) = scoreboard();
        board.apply_players_snapshot("ABC234", vec![player("p1", "Ana", 3)]);
        // Reset: Bia sorts first on the zeroed board but must not celebrate
        board.apply_players_snapshot(
            "ABC234",
            vec![player("p1", "Ana", 0), player("p2", "Bia", 0)],
        );
        assert!(history.entries("ABC234").is_empty());

        // Bia then actually scores; the leader pointer already moved to her,
        // so no transition fires for merely confirming the head.
        board.apply_players_snapshot(
            "ABC234",
            vec![player("p1", "Ana", 0), player("p2", "Bia", 2)],
        );
        assert!(history.entries("ABC234").is_empty());

        // Ana overtaking is a real transition again
        board.apply_players_snapshot(
            "ABC234",
            vec![player("p1", "Ana", 7), player("p2", "Bia", 2)],
        );
        let entries = history.entries("ABC234");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_name, "Ana");
    }

    #[test]
    fn test_forget_room_resets_initial_load() {
        let (board, history) = scoreboard();
        board.apply_players_snapshot("ABC234", vec![player("p1", "Ana", 3)]);
        board.forget_room("ABC234");

        // First snapshot after reset is initial again, even with a new head
        board.apply_players_snapshot("ABC234", vec![player("p2", "Bia", 9)]);
        assert!(history.entries("ABC234").is_empty());
    }
}
