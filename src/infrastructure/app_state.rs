use std::sync::Arc;

use async_broadcast::{broadcast, InactiveReceiver, Sender};
use sqlx::SqlitePool;

use crate::domain::entities::{Player, Room};
use crate::infrastructure::auth::{GoogleConfig, GoogleIdentityService, IdentityVerifier, JwtService};
use crate::infrastructure::database::repositories::{
    SqlitePlayerRepository, SqliteRoomRepository, SqliteUserRepository,
};
use crate::infrastructure::database::schema;
use crate::infrastructure::services::{HistoryLog, Scoreboard, SessionManager, SoundManager};

/// A change published by the store after a mutation. Each variant carries the
/// full resolved state, never a diff, matching the snapshot semantics the
/// rest of the system is built on.
#[derive(Debug, Clone)]
pub enum StoreChange {
    Room {
        room_id: String,
        /// `None` when the document no longer exists
        room: Option<Room>,
    },
    Players {
        room_id: String,
        players: Vec<Player>,
    },
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// JWT service for token management
    pub jwt_service: Arc<JwtService>,

    /// Identity provider (Google in production, swappable in tests)
    pub identity: Arc<dyn IdentityVerifier>,

    /// Session manager for tracking room visits
    pub session_manager: Arc<SessionManager>,

    /// Repositories
    pub user_repo: Arc<SqliteUserRepository>,
    pub room_repo: Arc<SqliteRoomRepository>,
    pub player_repo: Arc<SqlitePlayerRepository>,

    /// Per-room side-effect services
    pub history: Arc<HistoryLog>,
    pub sounds: Arc<SoundManager>,
    pub scoreboard: Arc<Scoreboard>,

    /// Store change feed (repositories publish, the reconciler consumes).
    /// The kept receivers are inactive: they hold the channels open without
    /// buffering events nobody reads.
    pub store_sender: Sender<StoreChange>,
    store_receiver: InactiveReceiver<StoreChange>,

    /// Room event broadcaster for SSE subscribers
    pub event_sender: Sender<RoomEvent>,
    pub event_receiver: InactiveReceiver<RoomEvent>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        // Get database path from environment
        let db_path = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_PATH"))
            .unwrap_or_else(|_| "sqlite:./data/boardscore.db".to_string());

        // Ensure path has sqlite: prefix
        let db_url = if db_path.starts_with("sqlite:") {
            db_path
        } else {
            format!("sqlite:{}", db_path)
        };

        Self::with_database_url(&db_url).await
    }

    /// Build state against an explicit database URL (tests use throwaway
    /// databases)
    pub async fn with_database_url(db_url: &str) -> anyhow::Result<Self> {
        tracing::info!("Connecting to database: {}", db_url);

        let db = SqlitePool::connect(db_url).await?;
        schema::init(&db).await?;

        // Create JWT service
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "boardscore-secret-key-change-in-production".to_string());
        let jwt_service = Arc::new(JwtService::new(jwt_secret));

        // Identity provider
        let identity: Arc<dyn IdentityVerifier> =
            Arc::new(GoogleIdentityService::new(GoogleConfig::default()));

        let session_manager = Arc::new(SessionManager::new());

        // Store change feed and outgoing room events (capacity of 1000 each)
        let (store_sender, store_receiver) = broadcast(1000);
        let store_receiver = store_receiver.deactivate();
        let (event_sender, event_receiver) = broadcast(1000);
        let event_receiver = event_receiver.deactivate();

        // Create repositories
        let user_repo = Arc::new(SqliteUserRepository::new(db.clone()));
        let room_repo = Arc::new(SqliteRoomRepository::new(db.clone(), store_sender.clone()));
        let player_repo = Arc::new(SqlitePlayerRepository::new(db.clone(), store_sender.clone()));

        let history = Arc::new(HistoryLog::new(event_sender.clone()));
        let sounds = Arc::new(SoundManager::new(event_sender.clone()));
        let scoreboard = Arc::new(Scoreboard::new(
            history.clone(),
            sounds.clone(),
            event_sender.clone(),
        ));

        let state = Self {
            db,
            jwt_service,
            identity,
            session_manager,
            user_repo,
            room_repo,
            player_repo,
            history,
            sounds,
            scoreboard,
            store_sender,
            store_receiver,
            event_sender,
            event_receiver,
        };

        state.spawn_reconciler();

        Ok(state)
    }

    /// Run the store-feed consumer that keeps every room's board reconciled.
    /// One subscription serves all rooms; per-room state lives in the
    /// scoreboard service.
    fn spawn_reconciler(&self) {
        let mut receiver = self.store_sender.new_receiver();
        let scoreboard = self.scoreboard.clone();
        let history = self.history.clone();
        let sounds = self.sounds.clone();
        let sessions = self.session_manager.clone();
        let events = self.event_sender.clone();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(StoreChange::Players { room_id, players }) => {
                        scoreboard.apply_players_snapshot(&room_id, players);
                    }
                    Ok(StoreChange::Room { room_id, room }) => match room {
                        Some(room) => {
                            let event = RoomEvent::new("roomUpdated", &room_id)
                                .with_data(serde_json::json!({ "room": room }));
                            let _ = events.try_broadcast(event);
                        }
                        None => {
                            // Room is gone: drop every per-room buffer so a
                            // future room under the same id starts clean.
                            scoreboard.forget_room(&room_id);
                            history.clear(&room_id);
                            sounds.forget_room(&room_id);
                            sessions.end_room_visits(&room_id);

                            let event = RoomEvent::new("roomDeleted", &room_id);
                            let _ = events.try_broadcast(event);
                        }
                    },
                    Err(async_broadcast::RecvError::Overflowed(missed)) => {
                        tracing::warn!("store feed overflowed, missed {missed} changes");
                    }
                    Err(async_broadcast::RecvError::Closed) => break,
                }
            }
        });
    }

}

/// Room event for SSE broadcasting
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub room_id: String,
    /// Additional data fields (flattened into root)
    #[serde(flatten)]
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl RoomEvent {
    pub fn new(event_type: &str, room_id: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            room_id: room_id.to_string(),
            data: serde_json::Value::Object(serde_json::Map::new()),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
