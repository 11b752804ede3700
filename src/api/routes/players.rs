use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::routes::rooms::PlayerResponse;
use crate::api::routes::ErrorResponse;
use crate::api::AppState;
use crate::application::board::{
    AddPlayer, AddPlayerError, AddPlayerInput, ChangeScore, ChangeScoreError, ChangeScoreInput,
    ClearBoard, ClearBoardError, ClearBoardInput, RemovePlayer, RemovePlayerError,
    RemovePlayerInput, RenamePlayer, RenamePlayerError, RenamePlayerInput, ResetScores,
    ResetScoresError, ResetScoresInput,
};

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeScoreRequest {
    pub delta: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlayerRequest {
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetScoresRequest {
    /// Board as last seen by the caller. A player added after this list was
    /// captured keeps their score.
    pub player_ids: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClearBoardRequest {
    /// Keep the caller's own player on the board
    #[serde(default)]
    pub keep_self: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerResponse {
    success: bool,
    player: PlayerResponse,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn add_player(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(req): Json<AddPlayerRequest>,
) -> Result<(StatusCode, Json<AddPlayerResponse>), (StatusCode, Json<ErrorResponse>)> {
    let name = req.name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("VALIDATION_ERROR", "Player name is required")),
        )
    })?;

    let use_case = AddPlayer::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.session_manager.clone(),
        state.history.clone(),
        state.sounds.clone(),
    );

    // Manual adds are guests: no linked identity, multiple same-named
    // entries allowed.
    let input = AddPlayerInput {
        user_id: claims.user_id,
        room_id,
        name,
        linked_user_id: None,
        avatar_url: req.avatar_url,
    };

    match use_case.execute(input).await {
        Ok(player) => Ok((
            StatusCode::CREATED,
            Json(AddPlayerResponse {
                success: true,
                player: PlayerResponse::from_player(&player),
            }),
        )),
        Err(e) => Err(map_add_player_error(e)),
    }
}

pub async fn change_score(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((room_id, player_id)): Path<(String, String)>,
    Json(req): Json<ChangeScoreRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let delta = req.delta.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("VALIDATION_ERROR", "Delta is required")),
        )
    })?;

    let use_case = ChangeScore::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.session_manager.clone(),
        state.history.clone(),
        state.sounds.clone(),
    );

    let input = ChangeScoreInput {
        user_id: claims.user_id,
        room_id,
        player_id,
        delta,
    };

    match use_case.execute(input).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                ChangeScoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                ChangeScoreError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                ChangeScoreError::RoomFinished => (
                    StatusCode::CONFLICT,
                    "ROOM_FINISHED",
                    "Room is finished".to_string(),
                ),
                ChangeScoreError::NotAuthenticated => (
                    StatusCode::FORBIDDEN,
                    "NOT_AUTHENTICATED",
                    "Enter the room before changing scores".to_string(),
                ),
                ChangeScoreError::PlayerNotFound => (
                    StatusCode::NOT_FOUND,
                    "PLAYER_NOT_FOUND",
                    "Player not found".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CHANGE_SCORE_ERROR",
                    "Failed to change score".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn rename_player(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((room_id, player_id)): Path<(String, String)>,
    Json(req): Json<RenamePlayerRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let use_case = RenamePlayer::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.session_manager.clone(),
    );

    let input = RenamePlayerInput {
        user_id: claims.user_id,
        room_id,
        player_id,
        new_name: req.name.unwrap_or_default(),
    };

    match use_case.execute(input).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                RenamePlayerError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                RenamePlayerError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                RenamePlayerError::RoomFinished => (
                    StatusCode::CONFLICT,
                    "ROOM_FINISHED",
                    "Room is finished".to_string(),
                ),
                RenamePlayerError::NotAuthenticated => (
                    StatusCode::FORBIDDEN,
                    "NOT_AUTHENTICATED",
                    "Enter the room before renaming players".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENAME_PLAYER_ERROR",
                    "Failed to rename player".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn remove_player(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((room_id, player_id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let use_case = RemovePlayer::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.session_manager.clone(),
        state.history.clone(),
        state.sounds.clone(),
    );

    let input = RemovePlayerInput {
        user_id: claims.user_id,
        room_id,
        player_id,
    };

    match use_case.execute(input).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                RemovePlayerError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                RemovePlayerError::RoomFinished => (
                    StatusCode::CONFLICT,
                    "ROOM_FINISHED",
                    "Room is finished".to_string(),
                ),
                RemovePlayerError::NotAuthenticated => (
                    StatusCode::FORBIDDEN,
                    "NOT_AUTHENTICATED",
                    "Enter the room before removing players".to_string(),
                ),
                RemovePlayerError::PlayerNotFound => (
                    StatusCode::NOT_FOUND,
                    "PLAYER_NOT_FOUND",
                    "Player not found".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REMOVE_PLAYER_ERROR",
                    "Failed to remove player".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn reset_scores(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(req): Json<ResetScoresRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let use_case = ResetScores::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.history.clone(),
        state.sounds.clone(),
    );

    let input = ResetScoresInput {
        user_id: claims.user_id,
        user_nickname: claims.nickname,
        room_id,
        player_ids: req.player_ids,
    };

    match use_case.execute(input).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                ResetScoresError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                ResetScoresError::RoomFinished => (
                    StatusCode::CONFLICT,
                    "ROOM_FINISHED",
                    "Room is finished".to_string(),
                ),
                ResetScoresError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    "Only the room owner can reset scores".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RESET_SCORES_ERROR",
                    "Failed to reset scores".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn clear_board(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(req): Json<ClearBoardRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let use_case = ClearBoard::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.history.clone(),
        state.sounds.clone(),
    );

    let exclude_user_id = req.keep_self.then(|| claims.user_id.clone());
    let input = ClearBoardInput {
        user_id: claims.user_id,
        user_nickname: claims.nickname,
        room_id,
        exclude_user_id,
    };

    match use_case.execute(input).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                ClearBoardError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                ClearBoardError::RoomFinished => (
                    StatusCode::CONFLICT,
                    "ROOM_FINISHED",
                    "Room is finished".to_string(),
                ),
                ClearBoardError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    "Only the room owner can clear the board".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CLEAR_BOARD_ERROR",
                    "Failed to clear the board".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

fn map_add_player_error(e: AddPlayerError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &e {
        AddPlayerError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        AddPlayerError::RoomNotFound => (
            StatusCode::NOT_FOUND,
            "ROOM_NOT_FOUND",
            "Room not found".to_string(),
        ),
        AddPlayerError::RoomFinished => (
            StatusCode::CONFLICT,
            "ROOM_FINISHED",
            "Room is finished".to_string(),
        ),
        AddPlayerError::NotAuthenticated => (
            StatusCode::FORBIDDEN,
            "NOT_AUTHENTICATED",
            "Enter the room before adding players".to_string(),
        ),
        AddPlayerError::AlreadyJoined => (
            StatusCode::CONFLICT,
            "ALREADY_JOINED",
            "This identity already has a player in the room".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "ADD_PLAYER_ERROR",
            "Failed to add player".to_string(),
        ),
    };
    (status, Json(ErrorResponse::new(code, message)))
}
