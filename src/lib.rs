//! # Semantle Game Server
//!
//! Guess ranking and session engine for a semantic word-guessing game:
//! players submit guesses and learn how semantically close each one is to a
//! hidden target word, scored by embedding cosine similarity and ranked
//! against the whole vocabulary.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SEMANTLE SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  engine/           - Guess ranking & session engine          │
//! │  ├── vocabulary.rs - Word list + embeddings, read-only       │
//! │  ├── ranker.rs     - Cosine similarity and rank tables       │
//! │  ├── target.rs     - Random and deterministic daily targets  │
//! │  ├── session.rs    - Session store with per-session locking  │
//! │  ├── evaluator.rs  - Per-guess transaction                   │
//! │  └── stats.rs      - Per-user statistics                     │
//! │                                                              │
//! │  embeddings/       - Embedding acquisition (async seam)      │
//! │  └── provider.rs   - Provider trait, cache, timeout          │
//! │                                                              │
//! │  server/           - HTTP surface (presentation)             │
//! │  ├── protocol.rs   - Request/response schemas                │
//! │  └── routes.rs     - Axum handlers and error mapping         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Daily Challenge Guarantee
//!
//! The daily target is a pure function of (UTC date, vocabulary): a SHA-256
//! of the ISO date behind a domain separator, reduced modulo the vocabulary
//! size. Every instance serving the same day picks the identical word, with
//! no dependence on boot-time seeds or in-memory counters.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod embeddings;
pub mod engine;
pub mod server;

// Re-export commonly used types
pub use embeddings::{EmbeddingProvider, ProviderError, StubEmbeddingProvider};
pub use engine::evaluator::{AttemptResult, GuessError};
pub use engine::ranker::{cosine_similarity, RankTable};
pub use engine::session::{Attempt, GameSession, SessionId};
pub use engine::vocabulary::{LoadError, Vocabulary};
pub use engine::{EngineConfig, GameEngine, SessionSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
