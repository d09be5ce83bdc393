//! Two-pass letter matching
//!
//! Classic Wordle scoring, specified carefully because a naive single pass
//! double-counts repeated letters:
//!
//! 1. First pass: mark exact position matches as `Correct` and tombstone the
//!    matched secret letter so it cannot match again.
//! 2. Second pass: for every other guess position, consume the leftmost
//!    remaining secret occurrence of that letter as `Present`, else `Absent`.
//!
//! The result has one status per guess character. Guess and secret may differ
//! in length; only positions within the shorter of the two are eligible for
//! `Correct`.

use serde::{Deserialize, Serialize};

/// Per-position classification of a guess letter against the secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterStatus {
    /// Right letter, right position
    Correct,
    /// Letter occurs elsewhere in the secret
    Present,
    /// Letter does not occur in the (remaining) secret
    Absent,
}

/// Calculate the match pattern for `guess` against `secret`
///
/// Both inputs are normalized to uppercase. The returned vector has exactly
/// `guess.len()` entries. Total over any pair of strings, including empty and
/// mismatched lengths.
///
/// # Examples
/// ```
/// use proxle_engine::core::{LetterStatus, match_pattern};
///
/// let statuses = match_pattern("QUEST", "QUEEN");
/// assert_eq!(statuses[0], LetterStatus::Correct);
/// assert_eq!(statuses[4], LetterStatus::Absent);
/// ```
#[must_use]
pub fn match_pattern(guess: &str, secret: &str) -> Vec<LetterStatus> {
    let guess = guess.to_uppercase();
    let secret = secret.to_uppercase();

    // Exact match short-circuit; same output the two passes would produce
    if guess == secret {
        return vec![LetterStatus::Correct; guess.len()];
    }

    let guess_bytes = guess.as_bytes();
    let mut statuses = vec![LetterStatus::Absent; guess_bytes.len()];

    // Remaining pool of secret letters; a consumed letter becomes None
    let mut remaining: Vec<Option<u8>> = secret.bytes().map(Some).collect();

    // First pass: exact position matches
    let overlap = guess_bytes.len().min(remaining.len());
    for i in 0..overlap {
        if remaining[i] == Some(guess_bytes[i]) {
            statuses[i] = LetterStatus::Correct;
            remaining[i] = None;
        }
    }

    // Second pass: displaced letters, consuming the pool left-to-right
    for (i, &ch) in guess_bytes.iter().enumerate() {
        if statuses[i] == LetterStatus::Correct {
            continue;
        }
        if let Some(slot) = remaining.iter_mut().find(|slot| **slot == Some(ch)) {
            statuses[i] = LetterStatus::Present;
            *slot = None;
        }
    }

    statuses
}
