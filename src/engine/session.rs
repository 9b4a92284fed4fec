//! Session Store
//!
//! Holds live game sessions keyed by session id. Each session sits behind
//! its own lock so concurrent guesses against the same session serialize
//! while unrelated players never contend; the outer map lock is held only
//! for create/lookup/remove.
//!
//! Sessions live for a single server process. Eviction after an inactivity
//! TTL (and process restart) is observable to clients only as a subsequent
//! `SessionNotFound`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::engine::ranker::RankTable;

/// Unique session identifier.
pub type SessionId = Uuid;

/// One accepted guess: immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    /// Normalized guess word.
    pub word: String,
    /// Cosine similarity to the target, in `[-1, 1]`.
    pub similarity: f32,
    /// Rank among the whole vocabulary; 1 = the target itself.
    pub rank: u32,
    /// True iff the guess was the target word.
    pub is_correct: bool,
    /// When the guess was accepted.
    pub timestamp: DateTime<Utc>,
}

/// Server-side record of one in-progress or completed game.
///
/// Mutated only through the guess evaluator; the store hands out the session
/// behind a per-session lock, so `attempts` and `is_completed` never see
/// racing writers.
#[derive(Debug)]
pub struct GameSession {
    /// Unique session identifier.
    pub session_id: SessionId,
    /// The hidden word the player is hunting.
    pub target_word: String,
    /// True for the shared daily challenge.
    pub is_daily: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Accepted guesses in submission order.
    pub attempts: Vec<Attempt>,
    /// Terminal once true; no further scoring transitions are accepted.
    pub is_completed: bool,
    /// Full-vocabulary ranking for this target, built lazily on the first
    /// guess and reused for the session's lifetime.
    pub rank_table: Option<Arc<RankTable>>,
    /// Last guess activity, for TTL eviction.
    last_activity: Instant,
}

impl GameSession {
    fn new(session_id: SessionId, target_word: String, is_daily: bool) -> Self {
        Self {
            session_id,
            target_word,
            is_daily,
            created_at: Utc::now(),
            attempts: Vec::new(),
            is_completed: false,
            rank_table: None,
            last_activity: Instant::now(),
        }
    }

    /// Record activity, deferring TTL eviction.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn expired(&self, ttl: Duration) -> bool {
        self.last_activity.elapsed() > ttl
    }
}

/// All live sessions, each behind its own lock.
pub struct SessionStore {
    sessions: RwLock<BTreeMap<SessionId, Arc<RwLock<GameSession>>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store with the given inactivity TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
            ttl,
        }
    }

    /// Allocate a fresh session with no attempts and return it.
    pub async fn create(
        &self,
        target_word: String,
        is_daily: bool,
    ) -> (SessionId, Arc<RwLock<GameSession>>) {
        let id = Uuid::new_v4();
        let session = Arc::new(RwLock::new(GameSession::new(id, target_word, is_daily)));

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::clone(&session));

        (id, session)
    }

    /// Look up a session. `None` is an expected, recoverable condition: the
    /// client may hold an id from a previous server lifetime or an evicted
    /// session.
    pub async fn get(&self, id: &SessionId) -> Option<Arc<RwLock<GameSession>>> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Remove a session.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// True when no sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict sessions idle past the TTL. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut expired = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (id, session) in sessions.iter() {
                if session.read().await.expired(self.ttl) {
                    expired.push(*id);
                }
            }
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for id in expired {
            // Re-check under the write lock; a guess may have landed between
            // the scan and now.
            let still_expired = match sessions.get(&id) {
                Some(session) => session.read().await.expired(self.ttl),
                None => false,
            };
            if still_expired && sessions.remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_initializes_fresh_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (id, session) = store.create("cat".to_string(), false).await;

        let s = session.read().await;
        assert_eq!(s.session_id, id);
        assert_eq!(s.target_word, "cat");
        assert!(!s.is_daily);
        assert!(s.attempts.is_empty());
        assert!(!s.is_completed);
        assert!(s.rank_table.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let store = SessionStore::new(Duration::from_secs(60));
        let _ = store.create("cat".to_string(), false).await;

        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (a, _) = store.create("cat".to_string(), false).await;
        let (b, _) = store.create("cat".to_string(), true).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (id, _) = store.create("cat".to_string(), false).await;

        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_eviction_removes_idle_sessions() {
        let store = SessionStore::new(Duration::from_millis(10));
        let (id, _) = store.create("cat".to_string(), false).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        let removed = store.evict_expired().await;

        assert_eq!(removed, 1);
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_eviction_spares_active_sessions() {
        let store = SessionStore::new(Duration::from_millis(50));
        let (id, session) = store.create("cat".to_string(), false).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        session.write().await.touch();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // 60ms old but touched 30ms ago: inside the TTL.
        assert_eq!(store.evict_expired().await, 0);
        assert!(store.get(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_creates() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create("cat".to_string(), false).await.0
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.len().await, 16);
    }
}
