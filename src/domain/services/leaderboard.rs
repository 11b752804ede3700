//! Leaderboard service - board ordering and leader transitions
//!
//! The store only orders players by score; everything that must be
//! deterministic beyond that lives here.

use std::cmp::Ordering;

use crate::domain::entities::Player;

/// Sort players into board order: score descending, ties broken by
/// case-insensitive name ascending, then raw name as a final disambiguator.
/// The result is a total order, so two clients holding the same snapshot
/// always render the same board.
pub fn sort_players(players: &mut [Player]) {
    players.sort_by(compare_players);
}

fn compare_players(a: &Player, b: &Player) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Outcome of comparing a freshly sorted board against the previous leader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderTransition {
    pub new_leader_id: String,
    pub new_leader_name: String,
    pub previous_leader_id: Option<String>,
}

/// Detect a leader change between snapshots.
///
/// Returns `None` on the first snapshot after a (re)subscribe, when the board
/// is empty, when the head is unchanged, or when the new head's score is not
/// strictly positive (a reset must not celebrate whoever lands on top of a
/// zeroed board).
pub fn detect_leader_change(
    sorted: &[Player],
    previous_leader_id: Option<&str>,
    is_initial_snapshot: bool,
) -> Option<LeaderTransition> {
    if is_initial_snapshot {
        return None;
    }

    let head = sorted.first()?;
    if previous_leader_id == Some(head.id.as_str()) {
        return None;
    }
    if head.score <= 0 {
        return None;
    }

    Some(LeaderTransition {
        new_leader_id: head.id.clone(),
        new_leader_name: head.name.clone(),
        previous_leader_id: previous_leader_id.map(str::to_string),
    })
}

/// Current leader id of a sorted board, if any
pub fn leader_id(sorted: &[Player]) -> Option<&str> {
    sorted.first().map(|p| p.id.as_str())
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

    #[test]
    fn test_sort_ties_broken_by_name() {
        let mut players = vec![
            player("p3", "Carol", 5),
            player("p2", "bruno", 10),
            player("p1", "Ana", 10),
        ];
        sort_players(&mut players);

        let order: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["Ana", "bruno", "Carol"]);
    }

    #[test]
    fn test_sort_is_total_regardless_of_input_order() {
        let base = vec![
            player("p1", "Ana", 10),
            player("p2", "Bia", 10),
            player("p3", "Caio", 5),
        ];
        let mut a = base.clone();
        let mut b: Vec<Player> = base.into_iter().rev().collect();
        sort_players(&mut a);
        sort_players(&mut b);

        let ids_a: Vec<&str> = a.iter().map(|p| p.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(ids_a, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_initial_snapshot_never_fires() {
        let sorted = vec![player("p1", "Ana", 42)];
        assert!(detect_leader_change(&sorted, None, true).is_none());
    }

    #[test]
    fn test_leader_change_fires_once_per_transition() {
        let sorted = vec![player("p2", "Bia", 5), player("p1", "Ana", 3)];

        let change = detect_leader_change(&sorted, Some("p1"), false);
        assert_eq!(
            change,
            Some(LeaderTransition {
                new_leader_id: "p2".into(),
                new_leader_name: "Bia".into(),
                previous_leader_id: Some("p1".into()),
            })
        );

        // Same head on the next snapshot: no repeat
        assert!(detect_leader_change(&sorted, Some("p2"), false).is_none());
    }

    #[test]
    fn test_zero_score_leader_is_not_celebrated() {
        let sorted = vec![player("p2", "Bia", 0), player("p1", "Ana", 0)];
        assert!(detect_leader_change(&sorted, Some("p1"), false).is_none());

        let negative = vec![player("p2", "Bia", -1)];
        assert!(detect_leader_change(&negative, Some("p1"), false).is_none());
    }

    #[test]
    fn test_empty_board_is_quiet() {
        assert!(detect_leader_change(&[], Some("p1"), false).is_none());
    }
}
