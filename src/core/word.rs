//! Game word representation
//!
//! A `Word` stores a 3-5 letter uppercase word. Secrets always come from the
//! catalog, but guesses are player input and go through the same validation.

use std::fmt;

/// Shortest word the game accepts
pub const MIN_WORD_LEN: usize = 3;
/// Longest word the game accepts
pub const MAX_WORD_LEN: usize = 5;

/// A validated game word: 3-5 uppercase ASCII letters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    text: String,
}

/// Error type for invalid words
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    InvalidLength(usize),
    NonAscii,
    InvalidCharacters,
}

impl fmt::Display for WordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => {
                write!(
                    f,
                    "Word must be {MIN_WORD_LEN}-{MAX_WORD_LEN} letters, got {len}"
                )
            }
            Self::NonAscii => write!(f, "Word must contain only ASCII letters"),
            Self::InvalidCharacters => write!(f, "Word contains invalid characters"),
        }
    }
}

impl std::error::Error for WordError {}

impl Word {
    /// Create a new `Word` from a string, normalizing to uppercase
    ///
    /// # Errors
    /// Returns `WordError` if:
    /// - Length is outside 3-5
    /// - Contains non-ASCII characters
    /// - Contains non-alphabetic characters
    ///
    /// # Examples
    /// ```
    /// use proxle_engine::core::Word;
    ///
    /// let word = Word::new("queen").unwrap();
    /// assert_eq!(word.text(), "QUEEN");
    ///
    /// assert!(Word::new("ab").is_err());
    /// assert!(Word::new("qu33n").is_err());
    /// ```
    pub fn new(text: impl Into<String>) -> Result<Self, WordError> {
        let text: String = text.into().to_uppercase();

        if !(MIN_WORD_LEN..=MAX_WORD_LEN).contains(&text.len()) {
            return Err(WordError::InvalidLength(text.len()));
        }

        if !text.is_ascii() {
            return Err(WordError::NonAscii);
        }

        if !text.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(WordError::InvalidCharacters);
        }

        Ok(Self { text })
    }

    /// Get the word as a string slice
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of letters in the word
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always false for a validated word; present for API completeness
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_creation_valid() {
        let word = Word::new("QUEEN").unwrap();
        assert_eq!(word.text(), "QUEEN");
        assert_eq!(word.len(), 5);
    }

    #[test]
    fn word_creation_lowercase_normalized() {
        let word = Word::new("queen").unwrap();
        assert_eq!(word.text(), "QUEEN");

        let word2 = Word::new("QuEeN").unwrap();
        assert_eq!(word2.text(), "QUEEN");
    }

    #[test]
    fn word_creation_short_lengths() {
        assert_eq!(Word::new("fox").unwrap().text(), "FOX");
        assert_eq!(Word::new("echo").unwrap().text(), "ECHO");
    }

    #[test]
    fn word_creation_invalid_length() {
        assert!(matches!(
            Word::new("toolong"),
            Err(WordError::InvalidLength(7))
        ));
        assert!(matches!(Word::new("ab"), Err(WordError::InvalidLength(2))));
        assert!(matches!(Word::new(""), Err(WordError::InvalidLength(0))));
    }

    #[test]
    fn word_creation_invalid_characters() {
        assert!(Word::new("que3n").is_err()); // Number
        assert!(Word::new("que n").is_err()); // Space
        assert!(Word::new("que!n").is_err()); // Punctuation
    }

    #[test]
    fn word_equality_case_insensitive() {
        let word1 = Word::new("queen").unwrap();
        let word2 = Word::new("QUEEN").unwrap();
        let word3 = Word::new("quest").unwrap();

        assert_eq!(word1, word2);
        assert_ne!(word1, word3);
    }

    #[test]
    fn word_display() {
        let word = Word::new("fox").unwrap();
        assert_eq!(format!("{word}"), "FOX");
    }
}
