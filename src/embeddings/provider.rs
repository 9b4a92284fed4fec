//! Embedding Provider
//!
//! Async capability that turns a word into an embedding vector. The only
//! suspension point in the engine: everything else is pure in-memory
//! computation. Calls are bounded by a timeout so a slow provider cannot
//! stall session creation indefinitely.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::engine::vocabulary::{normalize_word, Vocabulary};

/// Errors from embedding acquisition. Recoverable and retryable: a failed
/// fetch never leaves partial session state behind.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The provider did not answer within the configured timeout.
    #[error("embedding fetch for {0:?} timed out")]
    Timeout(String),

    /// The provider answered with an error.
    #[error("embedding provider failed: {0}")]
    Failed(String),

    /// The provider returned a vector of the wrong dimensionality.
    #[error("embedding has dimension {found}, expected {expected}")]
    DimensionMismatch {
        /// Dimensionality the vocabulary was loaded with.
        expected: usize,
        /// Dimensionality the provider returned.
        found: usize,
    },
}

/// A source of embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Fetch the embedding for a word. The word is already normalized.
    async fn embed(&self, word: &str) -> Result<Vec<f32>, ProviderError>;

    /// Dimensionality of vectors this provider produces.
    fn dimension(&self) -> usize;
}

/// Deterministic provider deriving vectors from a hash of the word.
///
/// Stands in for an external embedding model in tests and local runs: same
/// word, same vector, on any platform. Not semantically meaningful.
#[derive(Debug, Clone)]
pub struct StubEmbeddingProvider {
    dimension: usize,
}

impl StubEmbeddingProvider {
    /// Create a stub producing vectors of the given dimensionality.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn embed(&self, word: &str) -> Result<Vec<f32>, ProviderError> {
        if word.is_empty() {
            return Err(ProviderError::Failed("empty word".to_string()));
        }

        let mut vector = Vec::with_capacity(self.dimension);
        let mut counter: u32 = 0;
        while vector.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(word.as_bytes());
            hasher.update(counter.to_le_bytes());
            let hash = hasher.finalize();
            for chunk in hash.chunks_exact(4) {
                if vector.len() == self.dimension {
                    break;
                }
                let raw = u32::from_le_bytes(chunk.try_into().unwrap_or_default());
                // Map to [-0.5, 0.5].
                vector.push((raw as f32 / u32::MAX as f32) - 0.5);
            }
            counter += 1;
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Caching, timeout-bounded front for an [`EmbeddingProvider`].
///
/// The cache is seeded from the vocabulary's precomputed vectors, so in the
/// common case `embed` resolves without touching the inner provider at all.
/// Only a cache miss suspends on I/O.
pub struct CachedProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: RwLock<HashMap<String, Arc<Vec<f32>>>>,
    timeout: Duration,
}

impl CachedProvider {
    /// Wrap a provider with an empty cache and the given fetch timeout.
    pub fn new(inner: Arc<dyn EmbeddingProvider>, timeout: Duration) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Pre-populate the cache with every vocabulary vector.
    pub async fn seed_from_vocabulary(&self, vocabulary: &Vocabulary) {
        let mut cache = self.cache.write().await;
        for entry in vocabulary.entries() {
            cache.insert(entry.word.clone(), Arc::new(entry.embedding.clone()));
        }
    }

    /// Resolve the embedding for a word: cache hit, or bounded fetch from
    /// the inner provider. Successful fetches are cached for reuse.
    pub async fn embed(&self, word: &str) -> Result<Arc<Vec<f32>>, ProviderError> {
        let word = normalize_word(word);

        if let Some(vector) = self.cache.read().await.get(&word) {
            return Ok(Arc::clone(vector));
        }

        let fetched = tokio::time::timeout(self.timeout, self.inner.embed(&word))
            .await
            .map_err(|_| ProviderError::Timeout(word.clone()))??;

        let expected = self.inner.dimension();
        if fetched.len() != expected {
            return Err(ProviderError::DimensionMismatch {
                expected,
                found: fetched.len(),
            });
        }

        let vector = Arc::new(fetched);
        self.cache
            .write()
            .await
            .insert(word, Arc::clone(&vector));
        Ok(vector)
    }

    /// Number of cached vectors.
    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Provider that always fails; for exercising warmup failure paths.
    pub struct FailingProvider {
        pub dimension: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        async fn embed(&self, _word: &str) -> Result<Vec<f32>, ProviderError> {
            Err(ProviderError::Failed("provider offline".to_string()))
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    /// Provider that never answers; for exercising the timeout bound.
    pub struct HangingProvider {
        pub dimension: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for HangingProvider {
        async fn embed(&self, _word: &str) -> Result<Vec<f32>, ProviderError> {
            std::future::pending().await
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }
}
