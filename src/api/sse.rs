use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;

use crate::domain::entities::Player;
use crate::domain::repositories::{PlayerRepository, RoomRepository};
use crate::infrastructure::app_state::{AppState, RoomEvent};

#[derive(Deserialize)]
pub struct StreamParams {
    /// Optional: a signed-in viewer gets forced-removal detection. Without a
    /// token the stream is a pure read-only display (TV view).
    token: Option<String>,
}

/// GET /api/rooms/:roomId/stream
///
/// One subscription serves both the initial load and every later update: the
/// first events carry the current room and sorted board, then the stream
/// relays live room/board/history/cue events. EventSource cannot set headers,
/// so the token rides in the query string.
pub async fn room_stream_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(params): Query<StreamParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let viewer_id = params
        .token
        .and_then(|token| state.jwt_service.verify(&token).ok())
        .map(|claims| claims.user_id);

    let mut receiver = state.event_sender.new_receiver();

    let stream = async_stream::stream! {
        tracing::debug!(%room_id, "room stream started");

        // Initial snapshot: the first delivery decides NotFound vs live view.
        let room = match state.room_repo.find_by_id(&room_id).await {
            Ok(room) => room,
            Err(e) => {
                tracing::error!(%room_id, "stream failed to load room: {e}");
                yield Ok(error_event("Failed to load room"));
                return;
            }
        };
        let room = match room {
            Some(room) => room,
            None => {
                yield Ok(Event::default()
                    .event("roomNotFound")
                    .data(serde_json::json!({ "roomId": room_id }).to_string()));
                return;
            }
        };

        let mut owner_id = room.owner_id.clone();
        yield Ok(room_event_to_sse(
            &RoomEvent::new("roomUpdated", &room_id)
                .with_data(serde_json::json!({ "room": room })),
        ));

        let players = match state.player_repo.list_by_room(&room_id).await {
            Ok(players) => state.scoreboard.sorted(players),
            Err(e) => {
                tracing::error!(%room_id, "stream failed to load players: {e}");
                yield Ok(error_event("Failed to load players"));
                return;
            }
        };
        let mut was_player = viewer_on_board(&players, viewer_id.as_deref());
        yield Ok(room_event_to_sse(
            &RoomEvent::new("boardUpdated", &room_id)
                .with_data(serde_json::json!({ "players": players })),
        ));

        let mut heartbeat_interval = tokio::time::interval(Duration::from_secs(20));
        heartbeat_interval.reset();

        loop {
            tokio::select! {
                _ = heartbeat_interval.tick() => {
                    yield Ok(Event::default().comment("heartbeat"));
                }
                result = receiver.recv() => {
                    match result {
                        Ok(event) if event.room_id == room_id => {
                            match event.event_type.as_str() {
                                "roomDeleted" => {
                                    yield Ok(room_event_to_sse(&event));
                                    break;
                                }
                                "roomUpdated" => {
                                    if let Some(room) = event.data.get("room") {
                                        owner_id = room
                                            .get("ownerId")
                                            .and_then(|v| v.as_str())
                                            .map(str::to_string);
                                    }
                                    yield Ok(room_event_to_sse(&event));
                                }
                                "boardUpdated" => {
                                    yield Ok(room_event_to_sse(&event));

                                    // Forced-removal detection: the viewer was
                                    // on the board and no longer is. Owners
                                    // removing themselves are not "kicked".
                                    let players: Vec<Player> = event
                                        .data
                                        .get("players")
                                        .cloned()
                                        .and_then(|v| serde_json::from_value(v).ok())
                                        .unwrap_or_default();
                                    let is_player =
                                        viewer_on_board(&players, viewer_id.as_deref());

                                    if let Some(viewer) = &viewer_id {
                                        let is_owner = owner_id.as_deref() == Some(viewer.as_str());
                                        if was_player && !is_player && !is_owner {
                                            state.session_manager.end_visit(viewer, &room_id);
                                            yield Ok(Event::default()
                                                .event("kicked")
                                                .data(serde_json::json!({
                                                    "roomId": room_id
                                                }).to_string()));
                                            break;
                                        }
                                    }
                                    was_player = is_player;
                                }
                                _ => {
                                    yield Ok(room_event_to_sse(&event));
                                }
                            }
                        }
                        Ok(_) => {} // another room's event
                        Err(async_broadcast::RecvError::Overflowed(missed)) => {
                            tracing::warn!(%room_id, "stream lagged, missed {missed} events");
                            yield Ok(error_event("Stream fell behind, reconnect"));
                            break;
                        }
                        Err(async_broadcast::RecvError::Closed) => break,
                    }
                }
            }
        }

        tracing::debug!(%room_id, "room stream closed");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn viewer_on_board(players: &[Player], viewer_id: Option<&str>) -> bool {
    match viewer_id {
        Some(id) => players.iter().any(|p| p.is_linked_to(id)),
        None => false,
    }
}

fn room_event_to_sse(event: &RoomEvent) -> Event {
    let json = serde_json::to_string(event).unwrap_or_default();
    Event::default().event("event").data(json)
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(serde_json::json!({ "error": message }).to_string())
}
