use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::api::middleware::Claims;
use crate::api::routes::ErrorResponse;
use crate::api::AppState;
use crate::domain::repositories::RoomRepository;
use crate::infrastructure::services::HistoryEntry;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    entries: Vec<HistoryEntry>,
}

/// GET /api/rooms/:roomId/history - point-in-time snapshot, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let exists = state.room_repo.exists(&room_id).await.map_err(|e| {
        tracing::error!("failed to load history: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("HISTORY_ERROR", "Failed to load history")),
        )
    })?;
    if !exists {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("ROOM_NOT_FOUND", "Room not found")),
        ));
    }

    Ok(Json(HistoryResponse {
        entries: state.history.entries(&room_id),
    }))
}

/// DELETE /api/rooms/:roomId/history - owner empties the room's log
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let room = state
        .room_repo
        .find_by_id(&room_id)
        .await
        .map_err(|e| {
            tracing::error!("failed to load room: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("HISTORY_ERROR", "Failed to clear history")),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("ROOM_NOT_FOUND", "Room not found")),
            )
        })?;

    if !room.can_manage(&claims.user_id) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "NOT_OWNER",
                "Only the room owner can clear the history",
            )),
        ));
    }

    state.history.clear(&room_id);
    Ok(StatusCode::NO_CONTENT)
}
