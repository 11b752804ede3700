use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::routes::auth::UserInfo;
use crate::api::routes::ErrorResponse;
use crate::api::AppState;
use crate::application::user::{UpdateNickname, UpdateNicknameError, UpdateNicknameInput};
use crate::domain::entities::{RecentRoom, User};
use crate::domain::repositories::UserRepository;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNicknameRequest {
    nickname: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRoomItem {
    room_id: String,
    name: String,
    role: String,
    has_password: bool,
    last_access: i64,
}

impl RecentRoomItem {
    fn from_entry(entry: &RecentRoom) -> Self {
        Self {
            room_id: entry.room_id.clone(),
            name: entry.name.clone(),
            role: entry.role.as_str().to_string(),
            has_password: entry.has_password,
            last_access: entry.last_access,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRoomsResponse {
    rooms: Vec<RecentRoomItem>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn load_user(
    state: &AppState,
    user_id: &str,
) -> Result<User, (StatusCode, Json<ErrorResponse>)> {
    state
        .user_repo
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!("failed to load profile: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("PROFILE_ERROR", "Failed to load profile")),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("USER_NOT_FOUND", "User not found")),
            )
        })
}

pub async fn update_nickname(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateNicknameRequest>,
) -> Result<Json<UserInfo>, (StatusCode, Json<ErrorResponse>)> {
    let nickname = req.nickname.unwrap_or_default();

    let use_case = UpdateNickname::new(state.user_repo.clone());
    match use_case
        .execute(UpdateNicknameInput {
            user_id: claims.user_id.clone(),
            nickname,
        })
        .await
    {
        Ok(user) => Ok(Json(UserInfo::from_user(&user))),
        Err(e) => {
            let (status, code, message) = match &e {
                UpdateNicknameError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                UpdateNicknameError::UserNotFound => (
                    StatusCode::NOT_FOUND,
                    "USER_NOT_FOUND",
                    "User not found".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROFILE_ERROR",
                    "Failed to update nickname".to_string(),
                ),
            };
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn get_recent_rooms(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RecentRoomsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = load_user(&state, &claims.user_id).await?;

    Ok(Json(RecentRoomsResponse {
        rooms: user.recent_rooms.iter().map(RecentRoomItem::from_entry).collect(),
    }))
}

pub async fn remove_recent_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let mut user = load_user(&state, &claims.user_id).await?;

    if user.remove_recent_room(&room_id) {
        state.user_repo.save(&user).await.map_err(|e| {
            tracing::error!("failed to save profile: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("PROFILE_ERROR", "Failed to update profile")),
            )
        })?;
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_recent_rooms(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let mut user = load_user(&state, &claims.user_id).await?;

    user.clear_recent_rooms();
    state.user_repo.save(&user).await.map_err(|e| {
        tracing::error!("failed to save profile: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("PROFILE_ERROR", "Failed to update profile")),
        )
    })?;

    Ok(StatusCode::NO_CONTENT)
}
