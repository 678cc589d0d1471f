//! HTTP server: the browser board and its JSON API.

use crate::coordinator::{MoveError, Phase, SharedGame, TurnTiming, play_opponent_turn};
use crate::oracle::MoveOracle;
use crate::session::SessionManager;
use crate::view::GameView;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Request body for a human move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Board index (0-8, where 0=top-left, 8=bottom-right).
    pub index: usize,
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    sessions: SessionManager,
    oracle: Arc<dyn MoveOracle>,
    timing: TurnTiming,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("oracle", &self.oracle.name())
            .field("timing", &self.timing)
            .finish()
    }
}

impl AppState {
    /// Creates server state.
    pub fn new(sessions: SessionManager, oracle: Arc<dyn MoveOracle>, timing: TurnTiming) -> Self {
        Self {
            sessions,
            oracle,
            timing,
        }
    }
}

/// API error, rendered as `{"error": "..."}`.
#[derive(Debug, derive_more::Display, derive_more::From)]
enum ApiError {
    #[display("{}", _0)]
    #[from]
    Move(MoveError),
    #[display("Unknown session {}", _0)]
    UnknownSession(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Move(MoveError::OutOfBounds(_)) => StatusCode::BAD_REQUEST,
            ApiError::Move(_) => StatusCode::CONFLICT,
            ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
        };
        debug!(%status, error = %self, "Request rejected");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/games", get(list_games))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{id}/moves", post(make_move))
        .route("/api/games/{id}/restart", post(restart))
        .with_state(state)
}

/// Binds `host:port` and serves until the process is stopped.
#[instrument(skip(state))]
pub async fn serve(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server ready at http://{}:{}/", host, port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_games(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.sessions.list_sessions())
}

#[instrument(skip(state))]
async fn get_game(State(state): State<AppState>, Path(id): Path<String>) -> Json<GameView> {
    let game = state.sessions.get_or_create(&id);
    let view = GameView::from(&*game.lock().await);
    Json(view)
}

#[instrument(skip(state))]
async fn make_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameView>, ApiError> {
    let game = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::UnknownSession(id.clone()))?;

    let view = {
        let mut coordinator = game.lock().await;
        coordinator.human_move(req.index)?;
        GameView::from(&*coordinator)
    };

    if view.phase == Phase::OpponentPending {
        spawn_opponent_turn(&state, &id, game);
    }
    Ok(Json(view))
}

#[instrument(skip(state))]
async fn restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    let game = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::UnknownSession(id.clone()))?;

    let mut coordinator = game.lock().await;
    coordinator.restart();
    Ok(Json(GameView::from(&*coordinator)))
}

fn spawn_opponent_turn(state: &AppState, id: &str, game: SharedGame) {
    let oracle = Arc::clone(&state.oracle);
    let timing = state.timing;
    tokio::spawn(
        async move {
            if let Err(e) = play_opponent_turn(&game, oracle.as_ref(), timing).await {
                warn!(error = %e, "Opponent turn failed");
            }
        }
        .instrument(info_span!("opponent_turn", session_id = %id)),
    );
}
