//! Guess Ranking & Session Engine
//!
//! The core of the game: target selection, per-session state, guess scoring
//! and full-vocabulary ranking. The HTTP layer in [`crate::server`] is a
//! thin translation over [`GameEngine`]; nothing outside this module mutates
//! a session directly.

pub mod evaluator;
pub mod ranker;
pub mod session;
pub mod stats;
pub mod target;
pub mod vocabulary;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::embeddings::{CachedProvider, EmbeddingProvider, ProviderError};
use self::evaluator::{evaluate_guess, AttemptResult, GuessError};
use self::session::{Attempt, SessionId, SessionStore};
use self::vocabulary::Vocabulary;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Reject a word that was already guessed in the same session instead
    /// of re-scoring it.
    pub reject_duplicates: bool,
    /// Bound on a single embedding fetch during target warmup.
    pub provider_timeout: Duration,
    /// Inactivity window after which a session may be evicted.
    pub session_ttl: Duration,
    /// How often the eviction sweep runs.
    pub eviction_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reject_duplicates: false,
            provider_timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            eviction_interval: Duration::from_secs(10 * 60),
        }
    }
}

/// Read-only view of a session handed to the presentation layer.
///
/// Carries the target word unconditionally; whether to expose it to the
/// client is a presentation decision, not an engine one.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: SessionId,
    /// The hidden target word.
    pub target_word: String,
    /// True for the shared daily challenge.
    pub is_daily: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Accepted guesses in submission order.
    pub attempts: Vec<Attempt>,
    /// Whether the target has been found.
    pub is_completed: bool,
}

/// The assembled engine: vocabulary, embedding capability, session store.
pub struct GameEngine {
    vocabulary: Arc<Vocabulary>,
    provider: CachedProvider,
    store: SessionStore,
    config: EngineConfig,
}

impl GameEngine {
    /// Assemble the engine and seed the embedding cache from the vocabulary.
    pub async fn new(
        vocabulary: Arc<Vocabulary>,
        provider: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        let provider = CachedProvider::new(provider, config.provider_timeout);
        provider.seed_from_vocabulary(&vocabulary).await;
        let store = SessionStore::new(config.session_ttl);

        Self {
            vocabulary,
            provider,
            store,
            config,
        }
    }

    /// Start a new game.
    ///
    /// Daily mode derives the target from today's UTC date; otherwise the
    /// target is a uniform pick. The target vector is warmed before the
    /// session is stored, so a provider failure leaves nothing behind.
    pub async fn new_game(&self, daily: bool) -> Result<SessionSnapshot, ProviderError> {
        let target = if daily {
            target::daily_target(&self.vocabulary, Utc::now().date_naive())
        } else {
            target::random_target(&self.vocabulary)
        }
        .to_string();

        self.provider.embed(&target).await?;

        let (id, session) = self.store.create(target, daily).await;
        let snapshot = Self::snapshot(&*session.read().await);
        tracing::info!(session_id = %id, daily, "created game session");
        Ok(snapshot)
    }

    /// Submit a guess against a session.
    ///
    /// Guesses against the same session serialize on the session's own lock;
    /// unrelated sessions never contend.
    pub async fn submit_guess(
        &self,
        session_id: SessionId,
        word: &str,
    ) -> Result<AttemptResult, GuessError> {
        let session = self
            .store
            .get(&session_id)
            .await
            .ok_or(GuessError::SessionNotFound(session_id))?;

        let mut session = session.write().await;
        let result = evaluate_guess(
            &mut session,
            &self.vocabulary,
            word,
            self.config.reject_duplicates,
        )?;

        if result.is_correct {
            tracing::info!(
                session_id = %session_id,
                attempts = result.attempts,
                "session completed"
            );
        }
        Ok(result)
    }

    /// Fetch a read-only view of a session.
    pub async fn session(&self, session_id: SessionId) -> Option<SessionSnapshot> {
        let session = self.store.get(&session_id).await?;
        let session = session.read().await;
        Some(Self::snapshot(&session))
    }

    /// Case-insensitive vocabulary membership test.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// The shared vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }

    /// Run one eviction sweep. Returns how many sessions were removed.
    pub async fn evict_expired(&self) -> usize {
        let removed = self.store.evict_expired().await;
        if removed > 0 {
            tracing::info!(removed, "evicted idle sessions");
        }
        removed
    }

    fn snapshot(session: &session::GameSession) -> SessionSnapshot {
        SessionSnapshot {
            session_id: session.session_id,
            target_word: session.target_word.clone(),
            is_daily: session.is_daily,
            created_at: session.created_at,
            attempts: session.attempts.clone(),
            is_completed: session.is_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::provider::test_support::FailingProvider;
    use crate::embeddings::StubEmbeddingProvider;
    use uuid::Uuid;

    fn test_vocabulary() -> Arc<Vocabulary> {
        Arc::new(
            Vocabulary::from_pairs(vec![
                ("cat".to_string(), vec![1.0, 0.0]),
                ("dog".to_string(), vec![0.9, 0.1]),
                ("car".to_string(), vec![0.0, 1.0]),
            ])
            .unwrap(),
        )
    }

    async fn test_engine() -> GameEngine {
        let vocab = test_vocabulary();
        let provider = Arc::new(StubEmbeddingProvider::new(vocab.dimension()));
        GameEngine::new(vocab, provider, EngineConfig::default()).await
    }

    #[tokio::test]
    async fn test_new_game_and_guess_flow() {
        let engine = test_engine().await;
        let game = engine.new_game(false).await.unwrap();
        assert!(!game.is_completed);
        assert!(game.attempts.is_empty());

        let target = game.target_word.clone();
        let result = engine.submit_guess(game.session_id, &target).await.unwrap();
        assert!(result.is_correct);
        assert_eq!(result.rank, 1);
        assert_eq!(result.similarity, 1.0);

        let view = engine.session(game.session_id).await.unwrap();
        assert!(view.is_completed);
        assert_eq!(view.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_daily_games_share_target() {
        let engine = test_engine().await;
        let a = engine.new_game(true).await.unwrap();
        let b = engine.new_game(true).await.unwrap();
        assert_eq!(a.target_word, b.target_word);
        assert_ne!(a.session_id, b.session_id);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let engine = test_engine().await;
        let result = engine.submit_guess(Uuid::new_v4(), "cat").await;
        assert!(matches!(result, Err(GuessError::SessionNotFound(_))));
        assert!(engine.session(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_warmup_stores_no_session() {
        // Unseeded cache + broken provider: creation must fail cleanly.
        let vocab = test_vocabulary();
        let engine = GameEngine {
            vocabulary: Arc::clone(&vocab),
            provider: CachedProvider::new(
                Arc::new(FailingProvider { dimension: 2 }),
                Duration::from_millis(100),
            ),
            store: SessionStore::new(Duration::from_secs(60)),
            config: EngineConfig::default(),
        };

        let result = engine.new_game(false).await;
        assert!(result.is_err());
        assert_eq!(engine.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_guesses_serialize_per_session() {
        let engine = Arc::new(test_engine().await);
        let game = engine.new_game(false).await.unwrap();
        let target = game.target_word.clone();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let target = target.clone();
            let id = game.session_id;
            handles.push(tokio::spawn(
                async move { engine.submit_guess(id, &target).await },
            ));
        }

        let mut correct = 0;
        let mut completed_errors = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(result) if result.is_correct => correct += 1,
                Ok(_) => {}
                Err(GuessError::SessionAlreadyCompleted(_)) => completed_errors += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        // Completion flips exactly once; every racing guess afterwards is
        // rejected without touching the attempt list.
        assert_eq!(correct, 1);
        assert_eq!(completed_errors, 7);
        let view = engine.session(game.session_id).await.unwrap();
        assert_eq!(view.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let engine = test_engine().await;
        let a = engine.new_game(false).await.unwrap();
        let b = engine.new_game(false).await.unwrap();

        engine.submit_guess(a.session_id, "dog").await.unwrap();
        let b_view = engine.session(b.session_id).await.unwrap();
        assert!(b_view.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_rejection_configurable() {
        let vocab = test_vocabulary();
        let provider = Arc::new(StubEmbeddingProvider::new(vocab.dimension()));
        let config = EngineConfig {
            reject_duplicates: true,
            ..Default::default()
        };
        let engine = GameEngine::new(vocab, provider, config).await;

        let game = engine.new_game(false).await.unwrap();
        // Guess some word that is not the target.
        let word = if game.target_word == "dog" { "car" } else { "dog" };
        engine.submit_guess(game.session_id, word).await.unwrap();
        let result = engine.submit_guess(game.session_id, word).await;
        assert!(matches!(result, Err(GuessError::DuplicateGuess(_))));
    }
}
