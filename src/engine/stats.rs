//! Per-user game statistics.
//!
//! Keyed by an opaque user identifier the engine never interprets. Same
//! durability story as sessions: in-memory, lost on restart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::engine::session::SessionId;

/// History entries retained per user.
const MAX_HISTORY: usize = 100;

/// History entries returned in a summary.
const SUMMARY_HISTORY: usize = 20;

/// One finished (or abandoned) game as recorded against a user.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Session the record came from.
    pub session_id: SessionId,
    /// The target word; the game is over by the time a record lands here.
    pub target_word: String,
    /// Guesses taken.
    pub attempts: u32,
    /// Whether the target was found.
    pub completed: bool,
    /// Whether this was the shared daily challenge.
    pub is_daily: bool,
    /// When the record was taken.
    pub date: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct UserStats {
    total_games: u32,
    completed_games: u32,
    total_attempts: u32,
    history: Vec<GameRecord>,
}

/// Aggregated view returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    /// Games recorded for this user.
    pub total_games: u32,
    /// Games that found the target.
    pub completed_games: u32,
    /// Mean attempts across completed games; 0 with none completed.
    pub average_attempts: f32,
    /// Fewest attempts in any completed game; 0 with none completed.
    pub best_score: u32,
    /// Most recent games, newest last.
    pub games_history: Vec<GameRecord>,
}

/// In-memory per-user statistics store.
#[derive(Default)]
pub struct StatsStore {
    users: RwLock<BTreeMap<String, UserStats>>,
}

impl StatsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished game for a user. History is capped at the most
    /// recent [`MAX_HISTORY`] entries.
    pub async fn record(&self, user_id: &str, record: GameRecord) {
        let mut users = self.users.write().await;
        let stats = users.entry(user_id.to_string()).or_default();

        stats.total_games += 1;
        if record.completed {
            stats.completed_games += 1;
            stats.total_attempts += record.attempts;
        }

        stats.history.push(record);
        if stats.history.len() > MAX_HISTORY {
            let excess = stats.history.len() - MAX_HISTORY;
            stats.history.drain(..excess);
        }
    }

    /// Aggregated summary for a user. Unknown users get the zero summary.
    pub async fn summary(&self, user_id: &str) -> StatsSummary {
        let users = self.users.read().await;
        let Some(stats) = users.get(user_id) else {
            return StatsSummary {
                total_games: 0,
                completed_games: 0,
                average_attempts: 0.0,
                best_score: 0,
                games_history: Vec::new(),
            };
        };

        let average_attempts = if stats.completed_games > 0 {
            stats.total_attempts as f32 / stats.completed_games as f32
        } else {
            0.0
        };

        let best_score = stats
            .history
            .iter()
            .filter(|g| g.completed)
            .map(|g| g.attempts)
            .min()
            .unwrap_or(0);

        let start = stats.history.len().saturating_sub(SUMMARY_HISTORY);
        StatsSummary {
            total_games: stats.total_games,
            completed_games: stats.completed_games,
            average_attempts,
            best_score,
            games_history: stats.history[start..].to_vec(),
        }
    }
}
