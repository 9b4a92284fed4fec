//! Embedding acquisition.
//!
//! The engine treats embeddings as a capability: `embed(word) -> vector`.
//! Precomputed vocabulary vectors satisfy almost every call; the provider
//! seam exists so a target vector missing from the cache can be fetched from
//! an external model without the rest of the engine knowing how.

pub mod provider;

pub use provider::{CachedProvider, EmbeddingProvider, ProviderError, StubEmbeddingProvider};
