//! Word catalog and daily selection
//!
//! The catalog is an immutable ordered list of candidate words, compiled into
//! the binary at build time. Ordering is load-bearing: the daily selector
//! indexes into it, so editing the list changes the assignment history for
//! dates before the edit. That is an accepted, documented limitation.

mod embedded;
mod selector;

pub use embedded::{CATALOG_WORDS, CATALOG_WORDS_COUNT};
pub use selector::{
    MAX_CLIENT_DATE_SKEW_DAYS, PUZZLE_EPOCH, resolve_puzzle_date, today_utc, word_for_date,
};

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::core::{Word, WordError};

/// An immutable, ordered, duplicate-free list of candidate words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCatalog {
    words: Vec<Word>,
}

/// Error type for invalid catalogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Empty,
    Duplicate(String),
    InvalidWord(WordError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Catalog must contain at least one word"),
            Self::Duplicate(word) => write!(f, "Catalog contains duplicate word '{word}'"),
            Self::InvalidWord(err) => write!(f, "Invalid catalog word: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<WordError> for CatalogError {
    fn from(err: WordError) -> Self {
        Self::InvalidWord(err)
    }
}

impl WordCatalog {
    /// Build a catalog from already-validated words
    ///
    /// # Errors
    /// Returns `CatalogError` if the list is empty or contains duplicates.
    pub fn new(words: Vec<Word>) -> Result<Self, CatalogError> {
        if words.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for word in &words {
            if !seen.insert(word.text()) {
                return Err(CatalogError::Duplicate(word.text().to_string()));
            }
        }

        Ok(Self { words })
    }

    /// Build a catalog from raw strings, validating every entry
    ///
    /// Unlike a lenient loader this is strict: one bad entry fails the whole
    /// catalog, since a skipped word would silently shift every later
    /// assignment.
    ///
    /// # Errors
    /// Returns `CatalogError` on an invalid word, a duplicate, or an empty
    /// list.
    pub fn from_strs(strs: &[&str]) -> Result<Self, CatalogError> {
        let words = strs
            .iter()
            .map(|&s| Word::new(s))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(words)
    }

    /// The production catalog compiled into the binary
    ///
    /// # Panics
    /// Panics only if the generated list violates the catalog invariants,
    /// which the build script already rejects.
    #[must_use]
    pub fn embedded() -> &'static Self {
        static EMBEDDED: OnceLock<WordCatalog> = OnceLock::new();
        EMBEDDED.get_or_init(|| {
            Self::from_strs(CATALOG_WORDS).expect("embedded catalog validated at build time")
        })
    }

    /// Number of words in the catalog
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; catalogs reject empty construction
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at a catalog index
    ///
    /// # Panics
    /// Panics if `index >= len()`
    #[inline]
    #[must_use]
    pub fn word_at(&self, index: usize) -> &Word {
        &self.words[index]
    }

    /// All words in catalog order
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Word counts per length, for list-balance reporting
    #[must_use]
    pub fn length_distribution(&self) -> FxHashMap<usize, usize> {
        let mut counts = FxHashMap::default();
        for word in &self.words {
            *counts.entry(word.len()).or_insert(0) += 1;
        }
        counts
    }
}
