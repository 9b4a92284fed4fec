//! Wire format for the HTTP API.
//!
//! Explicit request/response schemas with validation at the boundary; the
//! shapes here are the compatibility contract with the excluded UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::session::Attempt;
use crate::engine::SessionSnapshot;

/// Request body for starting a new game.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGameRequest {
    /// True to join today's shared daily challenge.
    #[serde(default)]
    pub daily: bool,
}

/// Query toggling debug exposure of the target word.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DebugQuery {
    /// When true, session views include the target word.
    #[serde(default)]
    pub debug: bool,
}

/// Request body for submitting a guess.
#[derive(Debug, Clone, Deserialize)]
pub struct GuessRequest {
    /// Session the guess belongs to. Opaque; malformed ids behave like
    /// unknown ones.
    pub session_id: String,
    /// The guessed word; normalized server-side.
    pub word: String,
}

/// Scoring result for one accepted guess.
#[derive(Debug, Clone, Serialize)]
pub struct GuessResponse {
    /// Cosine similarity of the guess to the target.
    pub similarity: f32,
    /// Rank among the whole vocabulary; 1 = exact match.
    pub rank: u32,
    /// Whether this guess completed the game.
    pub is_correct: bool,
    /// Echo of the session id.
    pub session_id: Uuid,
    /// Attempts recorded so far, including this one.
    pub attempts: u32,
}

/// Full view of a game session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Session identifier.
    pub session_id: Uuid,
    /// The target word; present only when debug exposure was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_word: Option<String>,
    /// True for the shared daily challenge.
    pub is_daily: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Accepted guesses in submission order.
    pub attempts: Vec<Attempt>,
    /// Whether the target has been found.
    pub is_completed: bool,
}

impl SessionResponse {
    /// Build a response from an engine snapshot, optionally revealing the
    /// target word.
    pub fn from_snapshot(snapshot: SessionSnapshot, reveal_target: bool) -> Self {
        Self {
            session_id: snapshot.session_id,
            target_word: reveal_target.then_some(snapshot.target_word),
            is_daily: snapshot.is_daily,
            created_at: snapshot.created_at,
            attempts: snapshot.attempts,
            is_completed: snapshot.is_completed,
        }
    }
}

/// Response for vocabulary membership checks.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    /// Whether the word is in the vocabulary.
    pub valid: bool,
    /// Echo of the queried word.
    pub word: String,
}

/// Request to record a finished game against a user.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordStatsRequest {
    /// Opaque user identifier; never interpreted by the engine.
    pub user_id: String,
    /// Session to record.
    pub session_id: String,
}

/// Acknowledgement of a recorded game.
#[derive(Debug, Clone, Serialize)]
pub struct RecordStatsResponse {
    /// Always true on success.
    pub recorded: bool,
}

/// Error body: stable machine code plus human-readable message. Never
/// carries the target word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code, e.g. `invalid_word`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}
