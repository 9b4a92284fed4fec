//! Vocabulary Store
//!
//! Owns the canonical word list and its embedding vectors. Loaded once at
//! startup and shared read-only for the lifetime of the process; the full
//! set of words is the universe over which guess ranks are computed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Errors raised while loading the vocabulary. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Vocabulary file could not be read.
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    /// Vocabulary file is not valid JSON.
    #[error("failed to parse vocabulary file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two entries normalize to the same word.
    #[error("duplicate word after normalization: {0}")]
    DuplicateWord(String),

    /// An embedding has a different dimensionality than the rest.
    #[error("embedding for {word:?} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        /// Offending word.
        word: String,
        /// Dimensionality of the first entry.
        expected: usize,
        /// Dimensionality found for this entry.
        found: usize,
    },

    /// An entry normalizes to the empty string or has an empty vector.
    #[error("empty word or embedding in vocabulary entry {0:?}")]
    EmptyEntry(String),

    /// The vocabulary contains no entries at all.
    #[error("vocabulary is empty")]
    Empty,
}

/// On-disk vocabulary format: a JSON object mapping words to embeddings.
#[derive(Debug, Deserialize)]
struct VocabularyFile {
    words: BTreeMap<String, Vec<f32>>,
}

/// A single word and its embedding vector.
#[derive(Debug, Clone)]
pub struct VocabularyEntry {
    /// Normalized (trimmed, lower-case) word.
    pub word: String,
    /// Embedding vector; same dimensionality across the whole vocabulary.
    pub embedding: Vec<f32>,
}

/// Immutable word list plus embeddings.
///
/// Iteration order of [`Vocabulary::all_words`] is stable (sorted) and is the
/// tie-break basis for ranking, so repeated rank computations against the
/// same target are identical.
#[derive(Debug)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
    index: BTreeMap<String, usize>,
    dimension: usize,
}

/// Normalize a word the way the vocabulary and evaluator expect it:
/// trimmed and lower-cased.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

impl Vocabulary {
    /// Load a vocabulary from a JSON file (`{"words": {"cat": [1.0, 0.0]}}`).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let file: VocabularyFile = serde_json::from_str(&content)?;
        Self::from_pairs(file.words)
    }

    /// Build a vocabulary from word/embedding pairs.
    ///
    /// Fails if any two words collide after normalization, if any embedding
    /// has a different dimensionality than the first, or if the set is empty.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, Vec<f32>)>,
    ) -> Result<Self, LoadError> {
        // Normalize first so duplicate detection and sorting see final forms.
        let mut normalized: Vec<(String, Vec<f32>)> = Vec::new();
        for (word, embedding) in pairs {
            let word = normalize_word(&word);
            if word.is_empty() || embedding.is_empty() {
                return Err(LoadError::EmptyEntry(word));
            }
            normalized.push((word, embedding));
        }

        if normalized.is_empty() {
            return Err(LoadError::Empty);
        }

        normalized.sort_by(|a, b| a.0.cmp(&b.0));

        let dimension = normalized[0].1.len();
        let mut entries = Vec::with_capacity(normalized.len());
        let mut index = BTreeMap::new();

        for (word, embedding) in normalized {
            if embedding.len() != dimension {
                return Err(LoadError::DimensionMismatch {
                    word,
                    expected: dimension,
                    found: embedding.len(),
                });
            }
            if index.insert(word.clone(), entries.len()).is_some() {
                return Err(LoadError::DuplicateWord(word));
            }
            entries.push(VocabularyEntry { word, embedding });
        }

        Ok(Self {
            entries,
            index,
            dimension,
        })
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(&normalize_word(word))
    }

    /// All words in stable iteration order.
    pub fn all_words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.word.as_str())
    }

    /// Entries in stable iteration order.
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Embedding vector for a word, if present.
    pub fn vector_of(&self, word: &str) -> Option<&[f32]> {
        self.index
            .get(&normalize_word(word))
            .map(|&i| self.entries[i].embedding.as_slice())
    }

    /// Word at a given position in iteration order.
    pub fn word_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.word.as_str())
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the vocabulary has no entries. Never true after a successful load.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality, constant across all entries.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
