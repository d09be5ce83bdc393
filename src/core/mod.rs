//! Core domain types for the daily word game
//!
//! This module contains the fundamental domain types with no I/O: validated
//! words and the two-pass letter-matching algorithm. All types here are pure
//! and have clear, testable properties.

mod matching;
mod word;

pub use matching::{LetterStatus, match_pattern};
pub use word::{MAX_WORD_LEN, MIN_WORD_LEN, Word, WordError};
