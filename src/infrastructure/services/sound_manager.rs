use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::infrastructure::app_state::RoomEvent;

/// How long a high-priority cue suppresses everything below it
const HIGH_LOCK: Duration = Duration::from_millis(500);
/// How long a medium-priority cue suppresses score ticks
const MEDIUM_LOCK: Duration = Duration::from_millis(180);

/// Cue priority. Ordering matters: a playing cue blocks strictly lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuePriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One synthesized tone in a cue sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tone {
    pub frequency: f32,
    pub duration_ms: u64,
    pub waveform: Waveform,
    /// Offset from cue start
    pub delay_ms: u64,
}

/// A short synthesized cue, described as data for clients to render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundCue {
    pub name: &'static str,
    pub priority: CuePriority,
    /// When true, clients fade out lower-priority cues still playing
    pub stops_lower: bool,
    pub tones: Vec<Tone>,
}

fn tone(frequency: f32, duration_ms: u64, waveform: Waveform, delay_ms: u64) -> Tone {
    Tone {
        frequency,
        duration_ms,
        waveform,
        delay_ms,
    }
}

impl SoundCue {
    /// Rising two-note blip for a score gain (A5, C#6)
    pub fn coin() -> Self {
        Self {
            name: "coin",
            priority: CuePriority::Low,
            stops_lower: false,
            tones: vec![
                tone(880.0, 100, Waveform::Sine, 0),
                tone(1108.0, 100, Waveform::Sine, 50),
            ],
        }
    }

    /// Descending tones for a score loss (A4, E4)
    pub fn lose() -> Self {
        Self {
            name: "lose",
            priority: CuePriority::Low,
            stops_lower: false,
            tones: vec![
                tone(440.0, 100, Waveform::Sawtooth, 0),
                tone(330.0, 150, Waveform::Sawtooth, 80),
            ],
        }
    }

    /// Fanfare for a leader change (C5, E5, G5, C6)
    pub fn fanfare() -> Self {
        Self {
            name: "fanfare",
            priority: CuePriority::High,
            stops_lower: true,
            tones: [523.0, 659.0, 784.0, 1047.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, 150, Waveform::Triangle, i as u64 * 100))
                .collect(),
        }
    }

    /// Greeting arpeggio for a new player (C5, E5, G5)
    pub fn new_player() -> Self {
        Self {
            name: "newPlayer",
            priority: CuePriority::Medium,
            stops_lower: true,
            tones: vec![
                tone(523.0, 80, Waveform::Sine, 0),
                tone(659.0, 80, Waveform::Sine, 60),
                tone(784.0, 120, Waveform::Sine, 120),
            ],
        }
    }

    /// Low thud for a removed player
    pub fn delete() -> Self {
        Self {
            name: "delete",
            priority: CuePriority::Medium,
            stops_lower: true,
            tones: vec![tone(200.0, 150, Waveform::Square, 0)],
        }
    }
}

struct CueLock {
    above: CuePriority,
    until: Instant,
}

/// Priority-arbitrated cue playback, one lock per room.
///
/// A rare, important cue (leader fanfare) must not be drowned by a flurry of
/// score ticks, so triggering a cue blocks strictly lower priorities for a
/// short window. Suppressed cues are dropped, not queued.
pub struct SoundManager {
    locks: RwLock<HashMap<String, CueLock>>,
    events: async_broadcast::Sender<RoomEvent>,
}

impl SoundManager {
    pub fn new(events: async_broadcast::Sender<RoomEvent>) -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Trigger a cue for a room. Returns whether the cue was emitted or
    /// suppressed by a higher-priority lock.
    pub fn trigger(&self, room_id: &str, cue: SoundCue) -> bool {
        if !self.admit(room_id, &cue, Instant::now()) {
            return false;
        }

        let event = RoomEvent::new("soundCue", room_id)
            .with_data(serde_json::json!({ "cue": cue }));
        let _ = self.events.try_broadcast(event);
        true
    }

    fn admit(&self, room_id: &str, cue: &SoundCue, now: Instant) -> bool {
        let mut locks = self.locks.write().unwrap();

        if let Some(lock) = locks.get(room_id) {
            if now < lock.until && cue.priority < lock.above {
                return false;
            }
        }

        let window = match cue.priority {
            CuePriority::High => Some(HIGH_LOCK),
            CuePriority::Medium => Some(MEDIUM_LOCK),
            CuePriority::Low => None,
        };

        match window {
            Some(window) => {
                locks.insert(
                    room_id.to_string(),
                    CueLock {
                        above: cue.priority,
                        until: now + window,
                    },
                );
            }
            None => {
                // Expired locks are released lazily
                if locks
                    .get(room_id)
                    .is_some_and(|lock| now >= lock.until)
                {
                    locks.remove(room_id);
                }
            }
        }

        true
    }

    pub fn forget_room(&self, room_id: &str) {
        let mut locks = self.locks.write().unwrap();
        locks.remove(room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SoundManager {
        let (sender, _receiver) = async_broadcast::broadcast(16);
        SoundManager::new(sender)
    }

    #[test]
    fn test_high_blocks_lower_within_window() {
        let sounds = manager();
        assert!(sounds.trigger("ABC234", SoundCue::fanfare()));
        assert!(!sounds.trigger("ABC234", SoundCue::coin()));
        assert!(!sounds.trigger("ABC234", SoundCue::new_player()));
        // Equal priority is not blocked
        assert!(sounds.trigger("ABC234", SoundCue::fanfare()));
    }

    #[test]
    fn test_medium_blocks_only_low() {
        let sounds = manager();
        assert!(sounds.trigger("ABC234", SoundCue::new_player()));
        assert!(!sounds.trigger("ABC234", SoundCue::coin()));
        assert!(sounds.trigger("ABC234", SoundCue::fanfare()));
    }

    #[test]
    fn test_lock_expires() {
        let sounds = manager();
        let now = Instant::now();
        assert!(sounds.admit("ABC234", &SoundCue::fanfare(), now));

        let later = now + HIGH_LOCK + Duration::from_millis(1);
        assert!(sounds.admit("ABC234", &SoundCue::coin(), later));
    }

    #[test]
    fn test_rooms_are_independent() {
        let sounds = manager();
        assert!(sounds.trigger("ABC234", SoundCue::fanfare()));
        assert!(sounds.trigger("XYZ789", SoundCue::coin()));
    }
}
