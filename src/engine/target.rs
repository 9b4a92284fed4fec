//! Target Selector
//!
//! Chooses the hidden target word for a new session: uniformly at random for
//! normal games, or as a pure function of the UTC calendar date for the
//! shared daily challenge.

use chrono::NaiveDate;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::engine::vocabulary::Vocabulary;

/// Domain separator for daily target derivation.
///
/// Changing this string reshuffles every future daily word, so it is
/// versioned like a wire format.
const DAILY_DOMAIN: &[u8] = b"SEMANTLE_DAILY_V1";

/// Pick a target uniformly at random. Used only for non-daily games.
pub fn random_target(vocabulary: &Vocabulary) -> &str {
    if vocabulary.is_empty() {
        return "";
    }
    let index = rand::thread_rng().gen_range(0..vocabulary.len());
    vocabulary.word_at(index).unwrap_or_default()
}

/// Pick the daily target for a UTC calendar date.
///
/// Pure function of (date, vocabulary): hashes the ISO date behind a domain
/// separator and reduces the first 8 bytes modulo the vocabulary size, so
/// every instance serving the same day selects the identical word regardless
/// of process lifetime or boot-time randomness.
pub fn daily_target(vocabulary: &Vocabulary, date_utc: NaiveDate) -> &str {
    if vocabulary.is_empty() {
        return "";
    }
    let seed = derive_daily_seed(date_utc);
    let index = (seed % vocabulary.len() as u64) as usize;
    vocabulary.word_at(index).unwrap_or_default()
}

/// Derive the deterministic seed for a UTC calendar date.
pub fn derive_daily_seed(date_utc: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(DAILY_DOMAIN);
    hasher.update(date_utc.format("%Y-%m-%d").to_string().as_bytes());
    let hash = hasher.finalize();

    // First 8 bytes as the seed.
    u64::from_le_bytes(hash[0..8].try_into().unwrap_or_default())
}
