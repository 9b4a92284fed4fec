//! Similarity Ranker
//!
//! Scores candidate words against a target and computes each word's rank
//! among the entire vocabulary sorted by similarity to the target.
//!
//! Building a [`RankTable`] is `O(V log V)` in the vocabulary size, so
//! callers cache the table per target for the lifetime of a session instead
//! of recomputing it on every guess.

use std::collections::BTreeMap;

use crate::engine::vocabulary::{normalize_word, Vocabulary};

/// Cosine similarity between two vectors: `dot(a,b) / (|a| * |b|)`.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ;
/// degenerate inputs must not raise or produce NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Rank and similarity of a single vocabulary word against a fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedWord {
    /// Position in the similarity ordering; 1 = the target itself.
    pub rank: u32,
    /// Cosine similarity to the target, in `[-1, 1]`.
    pub similarity: f32,
}

/// Total ordering of the vocabulary by similarity to one target word.
///
/// The target itself is always rank 1 with similarity 1.0. Ties in
/// similarity are broken by vocabulary iteration order, so two tables built
/// for the same target are identical.
#[derive(Debug)]
pub struct RankTable {
    target: String,
    ordered: Vec<String>,
    by_word: BTreeMap<String, RankedWord>,
}

impl RankTable {
    /// Build the full ranking for a target word.
    ///
    /// Returns `None` if the target is not in the vocabulary; words outside
    /// the vocabulary have no defined rank.
    pub fn build(vocabulary: &Vocabulary, target: &str) -> Option<Self> {
        let target = normalize_word(target);
        let target_vector = vocabulary.vector_of(&target)?;

        struct Scored<'a> {
            word: &'a str,
            similarity: f32,
            is_target: bool,
        }

        let mut scored: Vec<Scored> = vocabulary
            .entries()
            .iter()
            .map(|entry| {
                let is_target = entry.word == target;
                // Self-similarity is exactly 1.0 by definition, not subject
                // to floating-point drift.
                let similarity = if is_target {
                    1.0
                } else {
                    cosine_similarity(target_vector, &entry.embedding)
                };
                Scored {
                    word: &entry.word,
                    similarity,
                    is_target,
                }
            })
            .collect();

        // Stable sort: equal similarities keep vocabulary order, except the
        // target wins any tie at 1.0.
        scored.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| b.is_target.cmp(&a.is_target))
        });

        let mut ordered = Vec::with_capacity(scored.len());
        let mut by_word = BTreeMap::new();
        for (i, s) in scored.iter().enumerate() {
            ordered.push(s.word.to_string());
            by_word.insert(
                s.word.to_string(),
                RankedWord {
                    rank: (i + 1) as u32,
                    similarity: s.similarity,
                },
            );
        }

        Some(Self {
            target,
            ordered,
            by_word,
        })
    }

    /// The target word this table was built for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Rank and similarity of a word, or `None` if outside the vocabulary.
    pub fn lookup(&self, word: &str) -> Option<RankedWord> {
        self.by_word.get(&normalize_word(word)).copied()
    }

    /// Rank of a word within the ordering; 1 = the target itself.
    pub fn rank_of(&self, word: &str) -> Option<u32> {
        self.lookup(word).map(|r| r.rank)
    }

    /// Words in rank order, most similar first.
    pub fn ordered_words(&self) -> &[String] {
        &self.ordered
    }

    /// Number of ranked words (the whole vocabulary).
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True only for an empty vocabulary, which cannot be loaded.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_vocabulary() -> Vocabulary {
        Vocabulary::from_pairs(vec![
            ("cat".to_string(), vec![1.0, 0.0]),
            ("dog".to_string(), vec![0.9, 0.1]),
            ("car".to_string(), vec![0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        // Zero-norm and mismatched inputs score 0 instead of panicking.
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_target_is_rank_one() {
        let vocab = test_vocabulary();
        let table = RankTable::build(&vocab, "cat").unwrap();

        let target = table.lookup("cat").unwrap();
        assert_eq!(target.rank, 1);
        assert_eq!(target.similarity, 1.0);
    }

    #[test]
    fn test_known_ranking() {
        let vocab = test_vocabulary();
        let table = RankTable::build(&vocab, "cat").unwrap();

        let dog = table.lookup("dog").unwrap();
        assert_eq!(dog.rank, 2);
        assert!((dog.similarity - 0.9938837).abs() < 1e-4);

        let car = table.lookup("car").unwrap();
        assert_eq!(car.rank, 3);
        assert!(car.similarity.abs() < 1e-6);
    }

    #[test]
    fn test_unknown_word_has_no_rank() {
        let vocab = test_vocabulary();
        let table = RankTable::build(&vocab, "cat").unwrap();
        assert!(table.lookup("horse").is_none());
    }

    #[test]
    fn test_unknown_target_rejected() {
        let vocab = test_vocabulary();
        assert!(RankTable::build(&vocab, "horse").is_none());
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let vocab = test_vocabulary();
        let a = RankTable::build(&vocab, "dog").unwrap();
        let b = RankTable::build(&vocab, "dog").unwrap();
        assert_eq!(a.ordered_words(), b.ordered_words());
    }

    #[test]
    fn test_ties_broken_by_vocabulary_order() {
        // beta and delta have identical vectors; beta precedes delta in
        // iteration order so it must rank first every time.
        let vocab = Vocabulary::from_pairs(vec![
            ("alpha".to_string(), vec![1.0, 0.0]),
            ("delta".to_string(), vec![0.5, 0.5]),
            ("beta".to_string(), vec![0.5, 0.5]),
        ])
        .unwrap();

        let table = RankTable::build(&vocab, "alpha").unwrap();
        assert_eq!(table.rank_of("beta"), Some(2));
        assert_eq!(table.rank_of("delta"), Some(3));
    }

    #[test]
    fn test_target_wins_tie_against_identical_vector() {
        // "aaa" sorts before "zzz" but "zzz" is the target, so "zzz" must
        // still take rank 1.
        let vocab = Vocabulary::from_pairs(vec![
            ("aaa".to_string(), vec![1.0, 0.0]),
            ("zzz".to_string(), vec![1.0, 0.0]),
        ])
        .unwrap();

        let table = RankTable::build(&vocab, "zzz").unwrap();
        assert_eq!(table.rank_of("zzz"), Some(1));
        assert_eq!(table.rank_of("aaa"), Some(2));
    }

    proptest! {
        /// Higher similarity always means a strictly lower (better) rank.
        #[test]
        fn prop_rank_monotonic_in_similarity(
            vectors in proptest::collection::vec(
                proptest::collection::vec(-1.0f32..1.0, 4),
                2..24,
            )
        ) {
            let pairs: Vec<(String, Vec<f32>)> = vectors
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("w{i:03}"), v))
                .collect();
            let vocab = Vocabulary::from_pairs(pairs).unwrap();
            let target = vocab.word_at(0).unwrap().to_string();
            let table = RankTable::build(&vocab, &target).unwrap();

            let ranked: Vec<RankedWord> = vocab
                .all_words()
                .map(|w| table.lookup(w).unwrap())
                .collect();

            for a in &ranked {
                for b in &ranked {
                    if a.similarity > b.similarity {
                        prop_assert!(a.rank < b.rank);
                    }
                }
            }
        }
    }
}
