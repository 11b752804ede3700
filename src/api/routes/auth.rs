use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::routes::{timestamp_to_rfc3339, ErrorResponse};
use crate::api::AppState;
use crate::application::auth::{SignIn, SignInError, SignInInput};
use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    id_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl UserInfo {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: timestamp_to_rfc3339(user.created_at),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    success: bool,
    user: UserInfo,
    token: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn google_sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleSignInRequest>,
) -> Result<Json<SignInResponse>, (StatusCode, Json<ErrorResponse>)> {
    let id_token = req.id_token.filter(|t| !t.is_empty()).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("MISSING_TOKEN", "Token is required")),
        )
    })?;

    let use_case = SignIn::new(
        state.user_repo.clone(),
        state.identity.clone(),
        state.jwt_service.clone(),
    );

    match use_case.execute(SignInInput { id_token }).await {
        Ok(output) => Ok(Json(SignInResponse {
            success: true,
            user: UserInfo::from_user(&output.user),
            token: output.token,
        })),
        Err(e) => {
            let (status, code, message) = match &e {
                SignInError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                SignInError::Identity(_) => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "Sign-in token was rejected".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SIGN_IN_ERROR",
                    "Sign-in failed".to_string(),
                ),
            };
            tracing::warn!("google sign-in failed: {e}");
            Err((status, Json(ErrorResponse::new(code, message))))
        }
    }
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserInfo>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .user_repo
        .find_by_id(&claims.user_id)
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
        })?;

    Ok(Json(UserInfo::from_user(&user)))
}
