pub mod auth;
pub mod health;
pub mod history;
pub mod players;
pub mod rooms;
pub mod users;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::Serialize;

use crate::api::middleware::{auth_middleware, optional_auth_middleware};
use crate::api::sse;
use crate::api::AppState;

/// Error payload shared by every route
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: None,
        }
    }
}

/// Convert timestamp to ISO 8601 string
pub(crate) fn timestamp_to_rfc3339(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", create_auth_router(state.clone()))
        .nest("/users", create_users_router(state.clone()))
        .nest("/rooms", create_rooms_router(state.clone()))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Create auth router
fn create_auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/google", post(auth::google_sign_in))
        .route(
            "/me",
            get(auth::me).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state)
}

/// Create users router
fn create_users_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/me",
            patch(users::update_nickname).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/me/recent-rooms",
            get(users::get_recent_rooms).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/me/recent-rooms",
            delete(users::clear_recent_rooms).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/me/recent-rooms/:roomId",
            delete(users::remove_recent_room).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state)
}

/// Create rooms router
fn create_rooms_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        // Creation works with or without a signed-in identity; rooms created
        // without one have no owner.
        .route(
            "/",
            post(rooms::create_room).layer(middleware::from_fn_with_state(
                state.clone(),
                optional_auth_middleware,
            )),
        )
        .route("/", get(rooms::list_rooms))
        .route("/:roomId", get(rooms::get_room))
        .route(
            "/:roomId",
            delete(rooms::delete_room).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/enter",
            post(rooms::enter_room).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/finish",
            post(rooms::finish_room).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/reopen",
            post(rooms::reopen_room).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/password",
            put(rooms::update_password).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Read-only board data (TV view) and the live stream
        .route("/:roomId/board", get(rooms::get_board))
        .route("/:roomId/stream", get(sse::room_stream_handler))
        .route("/:roomId/history", get(history::get_history))
        .route(
            "/:roomId/history",
            delete(history::clear_history).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/players",
            post(players::add_player).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/players/:playerId",
            delete(players::remove_player).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/players/:playerId/score",
            post(players::change_score).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/players/:playerId/name",
            put(players::rename_player).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/reset-scores",
            post(players::reset_scores).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:roomId/clear-board",
            post(players::clear_board).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state)
}
