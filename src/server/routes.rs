//! Axum HTTP server for the game engine.
//!
//! Thin translation layer: handlers parse the wire format, call the engine,
//! and map its error taxonomy onto status codes. No game rules live here.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | API information |
//! | GET | `/health` | Health check |
//! | POST | `/api/game/new` | Start a new game session |
//! | POST | `/api/game/guess` | Submit a guess |
//! | GET | `/api/game/{session_id}` | Fetch a session |
//! | GET | `/api/words/validate/{word}` | Vocabulary membership check |
//! | GET | `/api/stats/{user_id}` | Per-user statistics |
//! | POST | `/api/stats` | Record a finished game |

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::embeddings::ProviderError;
use crate::engine::evaluator::GuessError;
use crate::engine::stats::{GameRecord, StatsStore, StatsSummary};
use crate::engine::GameEngine;
use crate::server::protocol::{
    DebugQuery, ErrorBody, GuessRequest, GuessResponse, NewGameRequest, RecordStatsRequest,
    RecordStatsResponse, SessionResponse, ValidateResponse,
};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// The game engine.
    pub engine: Arc<GameEngine>,
    /// Per-user statistics.
    pub stats: Arc<StatsStore>,
}

/// Build the router with permissive CORS for the browser frontend.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/game/new", post(handle_new_game))
        .route("/api/game/guess", post(handle_guess))
        .route("/api/game/:session_id", get(handle_get_session))
        .route("/api/words/validate/:word", get(handle_validate_word))
        .route("/api/stats/:user_id", get(handle_get_stats))
        .route("/api/stats", post(handle_record_stats))
        .layer(cors)
        .with_state(state)
}

/// Engine errors translated to HTTP responses.
#[derive(Debug)]
pub struct ApiError(GuessError);

impl From<GuessError> for ApiError {
    fn from(err: GuessError) -> Self {
        Self(err)
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        Self(GuessError::Provider(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GuessError::InvalidWord(_) | GuessError::DuplicateGuess(_) => StatusCode::BAD_REQUEST,
            GuessError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            GuessError::SessionAlreadyCompleted(_) => StatusCode::CONFLICT,
            GuessError::Provider(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            error: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Treat a malformed session id like an unknown one: the id is opaque to
/// the client, and a 404 already means "start a new game".
fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(GuessError::SessionNotFound(Uuid::nil())))
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Semantle API",
        "version": crate::VERSION,
        "endpoints": {
            "game": {
                "new": "POST /api/game/new",
                "guess": "POST /api/game/guess",
                "session": "GET /api/game/{session_id}",
            },
            "stats": "GET /api/stats/{user_id}",
            "words": "GET /api/words/validate/{word}",
        },
    }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_new_game(
    State(state): State<AppState>,
    Query(query): Query<DebugQuery>,
    request: Option<Json<NewGameRequest>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(request) = request.unwrap_or_default();
    let snapshot = state.engine.new_game(request.daily).await?;
    Ok(Json(SessionResponse::from_snapshot(snapshot, query.debug)))
}

async fn handle_guess(
    State(state): State<AppState>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, ApiError> {
    let session_id = parse_session_id(&request.session_id)?;
    let result = state.engine.submit_guess(session_id, &request.word).await?;

    Ok(Json(GuessResponse {
        similarity: result.similarity,
        rank: result.rank,
        is_correct: result.is_correct,
        session_id,
        attempts: result.attempts,
    }))
}

async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<DebugQuery>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let snapshot = state
        .engine
        .session(session_id)
        .await
        .ok_or(GuessError::SessionNotFound(session_id))?;
    Ok(Json(SessionResponse::from_snapshot(snapshot, query.debug)))
}

async fn handle_validate_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: state.engine.is_valid_word(&word),
        word,
    })
}

async fn handle_get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<StatsSummary> {
    Json(state.stats.summary(&user_id).await)
}

async fn handle_record_stats(
    State(state): State<AppState>,
    Json(request): Json<RecordStatsRequest>,
) -> Result<Json<RecordStatsResponse>, ApiError> {
    let session_id = parse_session_id(&request.session_id)?;
    let snapshot = state
        .engine
        .session(session_id)
        .await
        .ok_or(GuessError::SessionNotFound(session_id))?;

    state
        .stats
        .record(
            &request.user_id,
            GameRecord {
                session_id: snapshot.session_id,
                target_word: snapshot.target_word,
                attempts: snapshot.attempts.len() as u32,
                completed: snapshot.is_completed,
                is_daily: snapshot.is_daily,
                date: chrono::Utc::now(),
            },
        )
        .await;

    Ok(Json(RecordStatsResponse { recorded: true }))
}
