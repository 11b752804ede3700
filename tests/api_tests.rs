//! API integration tests for the BoardScore backend
//!
//! Drives the HTTP surface end to end against a throwaway database per test.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use boardscore_backend::api;
use boardscore_backend::domain::entities::User;
use boardscore_backend::domain::repositories::{PlayerRepository, UserRepository};
use boardscore_backend::infrastructure::app_state::AppState;
use boardscore_backend::infrastructure::auth::{IdentityError, IdentityVerifier, VerifiedIdentity};

/// Identity provider double: accepts any token of the form `id|name|email`
struct FakeIdentity;

#[async_trait]
impl IdentityVerifier for FakeIdentity {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let mut parts = id_token.splitn(3, '|');
        let id = parts.next().filter(|s| !s.is_empty()).ok_or(IdentityError::Rejected)?;
        let name = parts.next().unwrap_or("Someone");
        let email = parts.next().unwrap_or("someone@example.com");
        Ok(VerifiedIdentity {
            id: id.to_string(),
            email: email.to_string(),
            display_name: name.to_string(),
            avatar_url: None,
        })
    }
}

/// Helper to create a test application with its own database
async fn create_test_app() -> (Router, Arc<AppState>) {
    std::env::set_var("JWT_SECRET", "test-secret-key");

    let db_url = format!(
        "sqlite:/tmp/boardscore-test-{}.db?mode=rwc",
        uuid::Uuid::new_v4()
    );
    let mut state = AppState::with_database_url(&db_url)
        .await
        .expect("Failed to create app state");
    state.identity = Arc::new(FakeIdentity);
    let state = Arc::new(state);

    let app = Router::new()
        .nest("/api", api::routes::create_api_router(state.clone()))
        .with_state(state.clone());

    (app, state)
}

/// Register a user directly and mint a token for them
async fn signed_in_user(state: &AppState, id: &str, nickname: &str) -> String {
    let mut user = User::new(
        id.to_string(),
        format!("{id}@example.com"),
        nickname.to_string(),
        None,
    );
    user.nickname = nickname.to_string();
    state.user_repo.save(&user).await.expect("Failed to save user");
    state
        .jwt_service
        .sign(id, nickname)
        .expect("Failed to sign token")
}

async fn request(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Poll until the condition holds; the reconciler runs on its own task, so
/// board side effects land shortly after a mutation returns.
async fn wait_for<F>(mut condition: F)
where
    F: FnMut() -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send>>,
{
    for _ in 0..50 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _state) = create_test_app().await;

    let (status, body) = request(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// Sign-in / profile
// ============================================================================

#[tokio::test]
async fn test_sign_in_creates_profile_and_preserves_nickname() {
    let (app, _state) = create_test_app().await;

    // First sign-in: nickname defaults to the provider display name
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/google",
        Some(json!({ "idToken": "g-1|Ana Silva|ana@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["nickname"], "Ana Silva");
    let token = body["token"].as_str().unwrap().to_string();

    // User renames herself
    let (status, body) = request(
        &app,
        "PATCH",
        "/api/users/me",
        Some(json!({ "nickname": "Aninha" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nickname"], "Aninha");

    // Provider changes the display name; the nickname must survive the sync
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/google",
        Some(json!({ "idToken": "g-1|Ana S.|ana@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["displayName"], "Ana S.");
    assert_eq!(body["user"]["nickname"], "Aninha");
}

#[tokio::test]
async fn test_sign_in_requires_token() {
    let (app, _state) = create_test_app().await;

    let (status, body) = request(&app, "POST", "/api/auth/google", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_TOKEN");
}

// ============================================================================
// Room creation
// ============================================================================

#[tokio::test]
async fn test_create_room_generates_code() {
    let (app, state) = create_test_app().await;
    let token = signed_in_user(&state, "u1", "Ana").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Game Night" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let code = body["room"]["id"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code
        .chars()
        .all(|c| "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".contains(c)));
    assert_eq!(body["room"]["status"], "active");
    assert_eq!(body["room"]["ownerId"], "u1");
    assert_eq!(body["room"]["hasPassword"], false);
}

#[tokio::test]
async fn test_create_room_without_identity_has_no_owner() {
    let (app, _state) = create_test_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Walk-in Game" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["room"]["ownerId"].is_null());
}

#[tokio::test]
async fn test_custom_room_id_is_normalized_and_conflicts() {
    let (app, state) = create_test_app().await;
    let token = signed_in_user(&state, "u1", "Ana").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Poker", "customId": "Poker Night!" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["room"]["id"], "poker-night");

    // Same slug again: user-facing conflict, no retry
    let (status, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Other Poker", "customId": "poker night" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CODE_TAKEN");
}

#[tokio::test]
async fn test_six_char_custom_id_is_treated_as_code() {
    let (app, state) = create_test_app().await;
    let token = signed_in_user(&state, "u1", "Ana").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Code Room", "customId": "abc234" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["room"]["id"], "ABC234");
}

// ============================================================================
// Entering rooms
// ============================================================================

#[tokio::test]
async fn test_enter_room_auto_joins_once() {
    let (app, state) = create_test_app().await;
    let token = signed_in_user(&state, "u1", "Ana").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Game Night" })),
        Some(&token),
    )
    .await;
    let room_id = body["room"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["name"], "Ana");
    assert_eq!(body["canManage"], true);
    assert_eq!(body["readOnly"], false);

    // Entering again must not add a second player
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let players = state.player_repo.list_by_room(&room_id).await.unwrap();
    assert_eq!(players.len(), 1);
}

#[tokio::test]
async fn test_enter_unknown_room_is_not_found() {
    let (app, state) = create_test_app().await;
    let token = signed_in_user(&state, "u1", "Ana").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/rooms/ZZZZZ9/enter",
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ROOM_NOT_FOUND");
}

#[tokio::test]
async fn test_enter_requires_sign_in() {
    let (app, _state) = create_test_app().await;

    let (status, _) = request(&app, "POST", "/api/rooms/ABC234/enter", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_gate() {
    let (app, state) = create_test_app().await;
    let owner_token = signed_in_user(&state, "owner", "Olivia").await;
    let guest_token = signed_in_user(&state, "guest", "Gabi").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Secret Game", "password": "abcd" })),
        Some(&owner_token),
    )
    .await;
    let room_id = body["room"]["id"].as_str().unwrap().to_string();

    // Owner skips the prompt entirely
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&owner_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Guest without password is prompted
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "PASSWORD_REQUIRED");

    // Wrong password stays on the prompt, retry allowed
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({ "password": "nope" })),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_PASSWORD");

    // Correct password enters and auto-joins
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({ "password": "abcd" })),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["name"], "Gabi");

    // Once authenticated, re-entry needs no password
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The visit lands in the guest's recent rooms
    let (status, body) = request(
        &app,
        "GET",
        "/api/users/me/recent-rooms",
        None,
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rooms = body["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["roomId"], room_id);
    assert_eq!(rooms[0]["role"], "player");
    assert_eq!(rooms[0]["hasPassword"], true);
}

// ============================================================================
// Board operations
// ============================================================================

/// Create a room, enter it, and return (room_id, token)
async fn room_with_owner(
    app: &Router,
    state: &AppState,
    user: &str,
    nickname: &str,
) -> (String, String) {
    let token = signed_in_user(state, user, nickname).await;
    let (_, body) = request(
        app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Game Night" })),
        Some(&token),
    )
    .await;
    let room_id = body["room"]["id"].as_str().unwrap().to_string();
    let (status, _) = request(
        app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (room_id, token)
}

#[tokio::test]
async fn test_board_sorts_ties_by_name() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "zz-owner").await;

    for name in ["Bob", "alice", "Carol"] {
        let (status, _) = request(
            &app,
            "POST",
            &format!("/api/rooms/{room_id}/players"),
            Some(json!({ "name": name })),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(&app, "GET", &format!("/api/rooms/{room_id}/board"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    // All scores are zero; case-insensitive name order breaks the tie
    assert_eq!(names, vec!["alice", "Bob", "Carol", "zz-owner"]);
}

#[tokio::test]
async fn test_concurrent_increments_do_not_lose_updates() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "Ana").await;

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players"),
        Some(json!({ "name": "Guest" })),
        Some(&token),
    )
    .await;
    let player_id = body["player"]["id"].as_str().unwrap().to_string();

    let score_path = format!("/api/rooms/{room_id}/players/{player_id}/score");
    let hits = (0..10).map(|_| {
        request(
            &app,
            "POST",
            &score_path,
            Some(json!({ "delta": 1 })),
            Some(&token),
        )
    });
    for (status, _) in futures::future::join_all(hits).await {
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let player = state
        .player_repo
        .find_by_id(&room_id, &player_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(player.score, 10);
}

#[tokio::test]
async fn test_score_change_logs_history_and_leader_cue() {
    let (app, state) = create_test_app().await;
    // The owner sorts first while everyone is at zero, so the guest's jump
    // to 5 is a genuine leader transition.
    let (room_id, owner_token) = room_with_owner(&app, &state, "owner", "Alice").await;

    let guest_token = signed_in_user(&state, "guest", "Zoe").await;
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let guest_player = body["player"]["id"].as_str().unwrap().to_string();

    // Owner raises the guest to sole leadership
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players/{guest_player}/score"),
        Some(json!({ "delta": 5 })),
        Some(&owner_token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The reconciler fires leader_change exactly once, alongside the
    // score_up entry from the mutation itself
    let history = state.history.clone();
    let rid = room_id.clone();
    wait_for(move || {
        let history = history.clone();
        let rid = rid.clone();
        Box::pin(async move {
            history
                .entries(&rid)
                .iter()
                .any(|e| e.action.as_str() == "leader_change")
        })
    })
    .await;

    let entries = state.history.entries(&room_id);
    let leader_changes: Vec<_> = entries
        .iter()
        .filter(|e| e.action.as_str() == "leader_change")
        .collect();
    assert_eq!(leader_changes.len(), 1);
    assert_eq!(leader_changes[0].player_name, "Zoe");
    assert!(entries.iter().any(|e| e.action.as_str() == "score_up"));

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/rooms/{room_id}/history"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_scores_only_touches_captured_ids() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "Ana").await;

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players"),
        Some(json!({ "name": "Early" })),
        Some(&token),
    )
    .await;
    let early = body["player"]["id"].as_str().unwrap().to_string();
    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players"),
        Some(json!({ "name": "Late" })),
        Some(&token),
    )
    .await;
    let late = body["player"]["id"].as_str().unwrap().to_string();

    for id in [&early, &late] {
        request(
            &app,
            "POST",
            &format!("/api/rooms/{room_id}/players/{id}/score"),
            Some(json!({ "delta": 7 })),
            Some(&token),
        )
        .await;
    }

    // The caller's captured board predates "Late" joining: only "Early" is
    // zeroed, which is the documented shape of the reset race.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/reset-scores"),
        Some(json!({ "playerIds": [early] })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let players = state.player_repo.list_by_room(&room_id).await.unwrap();
    let score_of = |id: &str| players.iter().find(|p| p.id == id).unwrap().score;
    assert_eq!(score_of(&early), 0);
    assert_eq!(score_of(&late), 7);
}

#[tokio::test]
async fn test_clear_board_can_keep_self() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "Ana").await;

    for name in ["Guest A", "Guest B"] {
        request(
            &app,
            "POST",
            &format!("/api/rooms/{room_id}/players"),
            Some(json!({ "name": name })),
            Some(&token),
        )
        .await;
    }

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/clear-board"),
        Some(json!({ "keepSelf": true })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let players = state.player_repo.list_by_room(&room_id).await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].name, "Ana");
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_finished_room_is_read_only_until_reopened() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "Ana").await;

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players"),
        Some(json!({ "name": "Guest" })),
        Some(&token),
    )
    .await;
    let player_id = body["player"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/finish"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "finished");
    assert!(!body["finishedAt"].is_null());

    // Every mutation is frozen
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players/{player_id}/score"),
        Some(json!({ "delta": 1 })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ROOM_FINISHED");

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players"),
        Some(json!({ "name": "Too Late" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Reopening clears the finished timestamp and unfreezes the board
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/reopen"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert!(body["finishedAt"].is_null());

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/players/{player_id}/score"),
        Some(json!({ "delta": 1 })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_only_owner_can_finish() {
    let (app, state) = create_test_app().await;
    let (room_id, _owner_token) = room_with_owner(&app, &state, "owner", "Olivia").await;
    let other_token = signed_in_user(&state, "other", "Otto").await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/finish"),
        None,
        Some(&other_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");
}

#[tokio::test]
async fn test_delete_room_cascades_players() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "Ana").await;

    for name in ["Guest A", "Guest B"] {
        request(
            &app,
            "POST",
            &format!("/api/rooms/{room_id}/players"),
            Some(json!({ "name": name })),
            Some(&token),
        )
        .await;
    }
    assert_eq!(state.player_repo.list_by_room(&room_id).await.unwrap().len(), 3);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/rooms/{room_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // No players and no room are left behind
    assert!(state.player_repo.list_by_room(&room_id).await.unwrap().is_empty());
    let (status, _) = request(&app, "GET", &format!("/api/rooms/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_password_gates_future_entries() {
    let (app, state) = create_test_app().await;
    let (room_id, owner_token) = room_with_owner(&app, &state, "owner", "Olivia").await;

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/rooms/{room_id}/password"),
        Some(json!({ "password": "hunter2" })),
        Some(&owner_token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let guest_token = signed_in_user(&state, "guest", "Gabi").await;
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "PASSWORD_REQUIRED");

    // Clearing the password reopens the door
    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/rooms/{room_id}/password"),
        Some(json!({ "password": null })),
        Some(&owner_token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&guest_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Nickname propagation
// ============================================================================

#[tokio::test]
async fn test_nickname_change_renames_player_on_next_entry() {
    let (app, state) = create_test_app().await;
    let (room_id, token) = room_with_owner(&app, &state, "u1", "Ana").await;

    let (status, _) = request(
        &app,
        "PATCH",
        "/api/users/me",
        Some(json!({ "nickname": "Ana Banana" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/rooms/{room_id}/enter"),
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["name"], "Ana Banana");

    let players = state.player_repo.list_by_room(&room_id).await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].name, "Ana Banana");
}
