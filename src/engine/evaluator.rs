//! Guess Evaluator
//!
//! The per-guess transaction: validate input, score against the target,
//! compute the vocabulary rank, and apply the session state transition.
//!
//! State machine per session: Active -> Active on an incorrect guess,
//! Active -> Completed on the exact target. Completed is terminal; no
//! further scoring transitions are accepted.
//!
//! Validation happens before any mutation, so a rejected guess never leaves
//! a partially-recorded attempt behind.

use std::sync::Arc;

use chrono::Utc;

use crate::embeddings::ProviderError;
use crate::engine::ranker::RankTable;
use crate::engine::session::{Attempt, GameSession, SessionId};
use crate::engine::vocabulary::{normalize_word, Vocabulary};

/// Recoverable guess-time errors. Each maps to a stable error code for the
/// HTTP layer; none of them reveals the target word.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuessError {
    /// The word is not in the vocabulary. No state change.
    #[error("word {0:?} is not in the vocabulary")]
    InvalidWord(String),

    /// No live session with this id; the client should start a new game.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The session already reached its target. Guard against stale clients.
    #[error("session {0} is already completed")]
    SessionAlreadyCompleted(SessionId),

    /// The word was already guessed and duplicate rejection is enabled.
    #[error("word {0:?} was already guessed")]
    DuplicateGuess(String),

    /// Embedding acquisition failed. Retryable.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GuessError {
    /// Stable machine-readable code for the external HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            GuessError::InvalidWord(_) => "invalid_word",
            GuessError::SessionNotFound(_) => "session_not_found",
            GuessError::SessionAlreadyCompleted(_) => "session_already_completed",
            GuessError::DuplicateGuess(_) => "duplicate_guess",
            GuessError::Provider(_) => "provider_error",
        }
    }
}

/// Outcome of one accepted guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptResult {
    /// Cosine similarity of the guess to the target.
    pub similarity: f32,
    /// Rank of the guess among the whole vocabulary; 1 = exact match.
    pub rank: u32,
    /// True iff the guess completed the session.
    pub is_correct: bool,
    /// Attempts recorded so far, including this one.
    pub attempts: u32,
}

/// Evaluate a guess against a session the caller holds exclusively.
///
/// The caller owns the per-session lock, which is what serializes concurrent
/// guesses for the same session; this function is pure in-memory computation
/// and never suspends.
pub fn evaluate_guess(
    session: &mut GameSession,
    vocabulary: &Vocabulary,
    word: &str,
    reject_duplicates: bool,
) -> Result<AttemptResult, GuessError> {
    if session.is_completed {
        return Err(GuessError::SessionAlreadyCompleted(session.session_id));
    }

    let word = normalize_word(word);
    if word.is_empty() || !vocabulary.contains(&word) {
        return Err(GuessError::InvalidWord(word));
    }

    if reject_duplicates && session.attempts.iter().any(|a| a.word == word) {
        return Err(GuessError::DuplicateGuess(word));
    }

    // Build the ranking on first use; dozens of guesses reuse it afterwards.
    let table = match &session.rank_table {
        Some(table) => Arc::clone(table),
        None => {
            let table = RankTable::build(vocabulary, &session.target_word)
                .map(Arc::new)
                // The target came out of this vocabulary at creation time.
                .ok_or_else(|| GuessError::InvalidWord(session.target_word.clone()))?;
            session.rank_table = Some(Arc::clone(&table));
            table
        }
    };

    let ranked = table
        .lookup(&word)
        .ok_or_else(|| GuessError::InvalidWord(word.clone()))?;
    let is_correct = word == session.target_word;

    session.attempts.push(Attempt {
        word,
        similarity: ranked.similarity,
        rank: ranked.rank,
        is_correct,
        timestamp: Utc::now(),
    });
    if is_correct {
        session.is_completed = true;
    }
    session.touch();

    Ok(AttemptResult {
        similarity: ranked.similarity,
        rank: ranked.rank,
        is_correct,
        attempts: session.attempts.len() as u32,
    })
}
