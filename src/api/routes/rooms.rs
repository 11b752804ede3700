use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::routes::{timestamp_to_rfc3339, ErrorResponse};
use crate::api::AppState;
use crate::application::room::{
    CreateRoom, CreateRoomError, CreateRoomInput, DeleteRoom, DeleteRoomError, DeleteRoomInput,
    EnterRoom, EnterRoomError, EnterRoomInput, FinishRoom, FinishRoomError, FinishRoomInput,
    ListRooms, ReopenRoom, ReopenRoomError, ReopenRoomInput, UpdatePassword, UpdatePasswordError,
    UpdatePasswordInput,
};
use crate::domain::entities::{Player, Room};
use crate::domain::repositories::PlayerRepository;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub custom_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRoomRequest {
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub has_password: bool,
    pub status: String,
    pub created_at: String,
    pub finished_at: Option<String>,
}

impl RoomResponse {
    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            owner_id: room.owner_id.clone(),
            has_password: room.has_password(),
            status: room.status.as_str().to_string(),
            created_at: timestamp_to_rfc3339(room.created_at),
            finished_at: room.finished_at.map(timestamp_to_rfc3339),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub linked_user_id: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl PlayerResponse {
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            score: player.score,
            linked_user_id: player.linked_user_id.clone(),
            avatar_url: player.avatar_url.clone(),
            created_at: timestamp_to_rfc3339(player.created_at),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    success: bool,
    room: RoomResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListResponse {
    rooms: Vec<RoomResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRoomResponse {
    success: bool,
    room: RoomResponse,
    read_only: bool,
    can_manage: bool,
    player: Option<PlayerResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    players: Vec<PlayerResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    claims: Option<Extension<Claims>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), (StatusCode, Json<ErrorResponse>)> {
    let name = req.name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("VALIDATION_ERROR", "Room name is required")),
        )
    })?;

    let use_case = CreateRoom::new(
        state.room_repo.clone(),
        state.user_repo.clone(),
        state.session_manager.clone(),
    );

    let input = CreateRoomInput {
        owner_id: claims.map(|Extension(c)| c.user_id),
        name,
        custom_id: req.custom_id.filter(|id| !id.trim().is_empty()),
        password: req.password,
    };

    match use_case.execute(input).await {
        Ok(output) => Ok((
            StatusCode::CREATED,
            Json(CreateRoomResponse {
                success: true,
                room: RoomResponse::from_room(&output.room),
            }),
        )),
        Err(e) => {
            let (status, code, message) = match &e {
                CreateRoomError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CreateRoomError::CodeTaken => (
                    StatusCode::CONFLICT,
                    "CODE_TAKEN",
                    "This room code is already in use".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CREATE_ROOM_ERROR",
                    "Failed to create room".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = ListRooms::new(state.room_repo.clone());
    match use_case.execute().await {
        Ok(rooms) => Ok(Json(RoomListResponse {
            rooms: rooms.iter().map(RoomResponse::from_room).collect(),
        })),
        Err(e) => {
            tracing::error!("failed to list rooms: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("LIST_ROOMS_ERROR", "Failed to list rooms")),
            ))
        }
    }
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, (StatusCode, Json<ErrorResponse>)> {
    use crate::domain::repositories::RoomRepository;

    let room = state
        .room_repo
        .find_by_id(&room_id)
        .await
        .map_err(|e| {
            tracing::error!("failed to load room: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("ROOM_ERROR", "Failed to load room")),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("ROOM_NOT_FOUND", "Room not found")),
            )
        })?;

    Ok(Json(RoomResponse::from_room(&room)))
}

pub async fn enter_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(req): Json<EnterRoomRequest>,
) -> Result<Json<EnterRoomResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = EnterRoom::new(
        state.room_repo.clone(),
        state.player_repo.clone(),
        state.user_repo.clone(),
        state.session_manager.clone(),
        state.history.clone(),
        state.sounds.clone(),
    );

    let input = EnterRoomInput {
        user_id: claims.user_id,
        room_id,
        password: req.password,
    };

    match use_case.execute(input).await {
        Ok(output) => Ok(Json(EnterRoomResponse {
            success: true,
            room: RoomResponse::from_room(&output.room),
            read_only: output.read_only,
            can_manage: output.can_manage,
            player: output.player.as_ref().map(PlayerResponse::from_player),
        })),
        Err(e) => {
            let (status, code, message) = match &e {
                EnterRoomError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                EnterRoomError::UserNotFound => (
                    StatusCode::NOT_FOUND,
                    "USER_NOT_FOUND",
                    "User not found".to_string(),
                ),
                EnterRoomError::PasswordRequired => (
                    StatusCode::UNAUTHORIZED,
                    "PASSWORD_REQUIRED",
                    "This room requires a password".to_string(),
                ),
                EnterRoomError::InvalidPassword => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_PASSWORD",
                    "Incorrect password".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ENTER_ROOM_ERROR",
                    "Failed to enter room".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn finish_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = FinishRoom::new(state.room_repo.clone());
    match use_case
        .execute(FinishRoomInput {
            user_id: claims.user_id,
            room_id,
        })
        .await
    {
        Ok(room) => Ok(Json(RoomResponse::from_room(&room))),
        Err(e) => {
            let (status, code, message) = match &e {
                FinishRoomError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                FinishRoomError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    "Only the room owner can finish the game".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FINISH_ROOM_ERROR",
                    "Failed to finish room".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn reopen_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = ReopenRoom::new(state.room_repo.clone());
    match use_case
        .execute(ReopenRoomInput {
            user_id: claims.user_id,
            room_id,
        })
        .await
    {
        Ok(room) => Ok(Json(RoomResponse::from_room(&room))),
        Err(e) => {
            let (status, code, message) = match &e {
                ReopenRoomError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                ReopenRoomError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    "Only the room owner can reopen the game".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REOPEN_ROOM_ERROR",
                    "Failed to reopen room".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let use_case = UpdatePassword::new(state.room_repo.clone());
    match use_case
        .execute(UpdatePasswordInput {
            user_id: claims.user_id,
            room_id,
            new_password: req.password,
        })
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                UpdatePasswordError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                UpdatePasswordError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    "Only the room owner can change the password".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPDATE_PASSWORD_ERROR",
                    "Failed to update password".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let use_case = DeleteRoom::new(state.room_repo.clone(), state.player_repo.clone());
    match use_case
        .execute(DeleteRoomInput {
            user_id: claims.user_id,
            room_id,
        })
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            let (status, code, message) = match &e {
                DeleteRoomError::RoomNotFound => (
                    StatusCode::NOT_FOUND,
                    "ROOM_NOT_FOUND",
                    "Room not found".to_string(),
                ),
                DeleteRoomError::NotOwner => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    "Only the room owner can delete the room".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DELETE_ROOM_ERROR",
                    "Failed to delete room".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

/// GET /api/rooms/:roomId/board - current sorted board (TV view)
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<BoardResponse>, (StatusCode, Json<ErrorResponse>)> {
    use crate::domain::repositories::RoomRepository;

    let exists = state.room_repo.exists(&room_id).await.map_err(|e| {
        tracing::error!("failed to load board: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("BOARD_ERROR", "Failed to load board")),
        )
    })?;
    if !exists {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("ROOM_NOT_FOUND", "Room not found")),
        ));
    }

    let players = state.player_repo.list_by_room(&room_id).await.map_err(|e| {
        tracing::error!("failed to load board: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("BOARD_ERROR", "Failed to load board")),
        )
    })?;
    let players = state.scoreboard.sorted(players);

    Ok(Json(BoardResponse {
        players: players.iter().map(PlayerResponse::from_player).collect(),
    }))
}
