//! Semantic-similarity oracle boundary
//!
//! The oracle is an external, possibly slow or unavailable service (an LLM).
//! Spelling feedback never depends on it: the caller computes the letter
//! match first, then asks this module for the semantic channel. Every failure
//! mode here (timeout, transport error, malformed reply) degrades to a local
//! heuristic verdict that the caller can tell apart from an oracle-backed one.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sentinel hint returned on the degraded path
pub const FALLBACK_HINT: &str = "Checking...";
/// Similarity reported for a non-exact guess when the oracle is unreachable
pub const FALLBACK_SIMILARITY: u8 = 15;
/// Hints are only issued while the guess is still semantically far off
pub const HINT_SIMILARITY_CEILING: u8 = 60;
/// Default bound on one oracle round trip
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// What the engine sends to the oracle
#[derive(Debug, Clone)]
pub struct SemanticRequest {
    pub guess: String,
    pub secret: String,
    /// Hints already issued this game, plus the guess and secret themselves;
    /// the oracle must not repeat any of these
    pub excluded_hints: Vec<String>,
}

/// Error type for oracle invocations
#[derive(Debug, Clone)]
pub enum OracleError {
    /// Transport failure, service down, cold start, quota, ...
    Unavailable(String),
    /// The service answered but the reply could not be used
    Malformed(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Oracle unavailable: {msg}"),
            Self::Malformed(msg) => write!(f, "Malformed oracle response: {msg}"),
        }
    }
}

impl std::error::Error for OracleError {}

/// External semantic-similarity oracle
///
/// Implementations return the raw model text; this module owns parsing and
/// sanitizing it. Implementations must be cheap to share across threads.
pub trait SemanticOracle: Send + Sync {
    fn evaluate(&self, request: &SemanticRequest) -> Result<String, OracleError>;
}

/// An oracle that is never reachable; exercises the fallback path
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineOracle;

impl SemanticOracle for OfflineOracle {
    fn evaluate(&self, _request: &SemanticRequest) -> Result<String, OracleError> {
        Err(OracleError::Unavailable("offline".to_string()))
    }
}

/// Where a verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticSource {
    /// The external oracle answered in time with a usable reply
    Oracle,
    /// Local heuristic; the semantic channel is degraded
    Fallback,
    /// Deterministic exact-match short circuit; the oracle was not consulted
    Exact,
}

/// Sanitized semantic verdict for one guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticVerdict {
    pub is_valid_word: bool,
    /// Clamped to 0-100
    pub similarity: u8,
    /// Single-word clue, empty when none applies
    pub hint: String,
    pub source: SemanticSource,
}

/// Raw oracle reply shape; every field defaulted so a partial reply still
/// parses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawVerdict {
    is_valid_word: Option<bool>,
    similarity: Option<f64>,
    hint: Option<String>,
}

/// Bounded, failure-tolerant wrapper around a [`SemanticOracle`]
pub struct HintService {
    oracle: Arc<dyn SemanticOracle>,
    timeout: Duration,
}

impl HintService {
    #[must_use]
    pub fn new(oracle: Arc<dyn SemanticOracle>) -> Self {
        Self::with_timeout(oracle, DEFAULT_ORACLE_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(oracle: Arc<dyn SemanticOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Evaluate a guess semantically, never failing
    ///
    /// Invokes the oracle under a bounded timeout; any failure falls back to
    /// the local heuristic. The returned verdict's `source` distinguishes the
    /// two paths.
    #[must_use]
    pub fn evaluate(&self, guess: &str, secret: &str, previous_hints: &[String]) -> SemanticVerdict {
        let guess = guess.to_uppercase();
        let secret = secret.to_uppercase();

        let mut excluded: Vec<String> = previous_hints.iter().map(|h| h.to_uppercase()).collect();
        excluded.push(guess.clone());
        excluded.push(secret.clone());

        let request = SemanticRequest {
            guess: guess.clone(),
            secret: secret.clone(),
            excluded_hints: excluded.clone(),
        };

        match self.invoke_with_timeout(request) {
            Ok(text) => match parse_reply(&text) {
                Ok(raw) => sanitize_verdict(raw, &secret, &excluded),
                Err(err) => {
                    warn!(%err, "oracle reply unusable, falling back");
                    fallback_verdict(&guess, &secret)
                }
            },
            Err(err) => {
                warn!(%err, "oracle call failed, falling back");
                fallback_verdict(&guess, &secret)
            }
        }
    }

    /// Run the oracle call on a worker thread and bound the wait
    fn invoke_with_timeout(&self, request: SemanticRequest) -> Result<String, OracleError> {
        let (tx, rx) = mpsc::channel();
        let oracle = Arc::clone(&self.oracle);

        thread::spawn(move || {
            // Receiver may have timed out and gone away; that's fine
            let _ = tx.send(oracle.evaluate(&request));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(OracleError::Unavailable(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// Extract and parse the first JSON object in the oracle's reply text
///
/// LLM replies routinely wrap the JSON in prose or code fences, so this takes
/// the outermost `{...}` span rather than requiring a clean document.
fn parse_reply(text: &str) -> Result<RawVerdict, OracleError> {
    let start = text
        .find('{')
        .ok_or_else(|| OracleError::Malformed("no JSON object in reply".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| OracleError::Malformed("unterminated JSON object".to_string()))?;
    if end < start {
        return Err(OracleError::Malformed("unterminated JSON object".to_string()));
    }

    serde_json::from_str(&text[start..=end]).map_err(|e| OracleError::Malformed(e.to_string()))
}

/// Clamp and sanitize a parsed oracle verdict
fn sanitize_verdict(raw: RawVerdict, secret: &str, excluded: &[String]) -> SemanticVerdict {
    let similarity = raw.similarity.unwrap_or(0.0).clamp(0.0, 100.0) as u8;

    let hint = raw.hint.unwrap_or_default().trim().to_string();
    let hint = sanitize_hint(hint, similarity, secret, excluded);

    SemanticVerdict {
        is_valid_word: raw.is_valid_word.unwrap_or(true),
        similarity,
        hint,
        source: SemanticSource::Oracle,
    }
}

/// Enforce the hint contract on whatever the oracle returned
///
/// A violating hint is dropped, not retried: we cannot re-validate semantic
/// meaning locally, so repeating the call would not help, and a missing hint
/// is harmless to the game.
fn sanitize_hint(hint: String, similarity: u8, secret: &str, excluded: &[String]) -> String {
    if hint.is_empty() || similarity >= HINT_SIMILARITY_CEILING {
        return String::new();
    }

    if hint.split_whitespace().count() > 1 {
        warn!(hint = %hint, "oracle hint is not a single word, dropping");
        return String::new();
    }

    let upper = hint.to_uppercase();
    if upper == secret || excluded.iter().any(|e| *e == upper) {
        warn!(hint = %hint, "oracle hint violates exclusion set, dropping");
        return String::new();
    }

    hint
}

/// Local heuristic used when the oracle cannot be consulted
///
/// Validity: at least 3 letters, contains a vowel (Y counts), and no run of
/// three or more consonants. Similarity carries only an exact-match signal.
#[must_use]
pub fn fallback_verdict(guess: &str, secret: &str) -> SemanticVerdict {
    let guess = guess.to_uppercase();

    if !is_plausible_word(&guess) {
        return SemanticVerdict {
            is_valid_word: false,
            similarity: 0,
            hint: String::new(),
            source: SemanticSource::Fallback,
        };
    }

    let similarity = if guess == secret.to_uppercase() {
        100
    } else {
        FALLBACK_SIMILARITY
    };

    SemanticVerdict {
        is_valid_word: true,
        similarity,
        hint: FALLBACK_HINT.to_string(),
        source: SemanticSource::Fallback,
    }
}

fn is_plausible_word(word: &str) -> bool {
    if word.len() < 3 {
        return false;
    }

    let is_vowel = |b: u8| matches!(b, b'A' | b'E' | b'I' | b'O' | b'U' | b'Y');

    if !word.bytes().any(is_vowel) {
        return false;
    }

    let mut consonant_run = 0;
    for b in word.bytes() {
        if b.is_ascii_uppercase() && !is_vowel(b) {
            consonant_run += 1;
            if consonant_run >= 3 {
                return false;
            }
        } else {
            consonant_run = 0;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Oracle returning a canned reply
    struct ScriptedOracle(String);

    impl SemanticOracle for ScriptedOracle {
        fn evaluate(&self, _request: &SemanticRequest) -> Result<String, OracleError> {
            Ok(self.0.clone())
        }
    }

    /// Oracle that never answers within any reasonable timeout
    struct StalledOracle;

    impl SemanticOracle for StalledOracle {
        fn evaluate(&self, _request: &SemanticRequest) -> Result<String, OracleError> {
            thread::sleep(Duration::from_secs(5));
            Ok(String::new())
        }
    }

    fn service(oracle: impl SemanticOracle + 'static) -> HintService {
        HintService::new(Arc::new(oracle))
    }

    #[test]
    fn oracle_reply_parsed_and_used() {
        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": 85, "hint": "Nautical"}"#.to_string(),
        ));
        let verdict = svc.evaluate("BOAT", "SHIP", &[]);

        assert!(verdict.is_valid_word);
        assert_eq!(verdict.similarity, 85);
        // Similarity >= 60 means no hint is issued
        assert_eq!(verdict.hint, "");
        assert_eq!(verdict.source, SemanticSource::Oracle);
    }

    #[test]
    fn low_similarity_keeps_hint() {
        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": 30, "hint": "Nautical"}"#.to_string(),
        ));
        let verdict = svc.evaluate("TABLE", "SHIP", &[]);
        assert_eq!(verdict.hint, "Nautical");
    }

    #[test]
    fn reply_wrapped_in_prose_still_parses() {
        let svc = service(ScriptedOracle(
            "Sure! Here you go:\n{\"isValidWord\": true, \"similarity\": 42, \"hint\": \"Royal\"}\nHope that helps."
                .to_string(),
        ));
        let verdict = svc.evaluate("CROWN", "QUEEN", &[]);
        assert_eq!(verdict.similarity, 42);
        assert_eq!(verdict.hint, "Royal");
        assert_eq!(verdict.source, SemanticSource::Oracle);
    }

    #[test]
    fn similarity_clamped_into_range() {
        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": 900, "hint": ""}"#.to_string(),
        ));
        assert_eq!(svc.evaluate("BOAT", "SHIP", &[]).similarity, 100);

        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": -5, "hint": ""}"#.to_string(),
        ));
        assert_eq!(svc.evaluate("BOAT", "SHIP", &[]).similarity, 0);
    }

    #[test]
    fn missing_fields_defaulted() {
        let svc = service(ScriptedOracle(r#"{"similarity": 10}"#.to_string()));
        let verdict = svc.evaluate("BOAT", "SHIP", &[]);

        assert!(verdict.is_valid_word);
        assert_eq!(verdict.similarity, 10);
        assert_eq!(verdict.hint, "");
    }

    #[test]
    fn hint_matching_secret_dropped() {
        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": 20, "hint": "ship"}"#.to_string(),
        ));
        let verdict = svc.evaluate("TABLE", "SHIP", &[]);
        assert_eq!(verdict.hint, "");
    }

    #[test]
    fn hint_in_exclusion_set_dropped() {
        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": 20, "hint": "Nautical"}"#.to_string(),
        ));
        let previous = vec!["nautical".to_string()];
        let verdict = svc.evaluate("TABLE", "SHIP", &previous);
        assert_eq!(verdict.hint, "");
    }

    #[test]
    fn multi_word_hint_dropped() {
        let svc = service(ScriptedOracle(
            r#"{"isValidWord": true, "similarity": 20, "hint": "big sea vessel"}"#.to_string(),
        ));
        let verdict = svc.evaluate("TABLE", "SHIP", &[]);
        assert_eq!(verdict.hint, "");
    }

    #[test]
    fn unavailable_oracle_falls_back() {
        let svc = service(OfflineOracle);
        let verdict = svc.evaluate("TABLE", "SHIP", &[]);

        assert!(verdict.is_valid_word);
        assert_eq!(verdict.similarity, FALLBACK_SIMILARITY);
        assert_eq!(verdict.hint, FALLBACK_HINT);
        assert_eq!(verdict.source, SemanticSource::Fallback);
    }

    #[test]
    fn garbage_reply_falls_back() {
        let svc = service(ScriptedOracle("I cannot help with that.".to_string()));
        let verdict = svc.evaluate("TABLE", "SHIP", &[]);
        assert_eq!(verdict.source, SemanticSource::Fallback);
    }

    #[test]
    fn stalled_oracle_times_out_to_fallback() {
        let svc = HintService::with_timeout(Arc::new(StalledOracle), Duration::from_millis(50));
        let verdict = svc.evaluate("TABLE", "SHIP", &[]);
        assert_eq!(verdict.source, SemanticSource::Fallback);
    }

    #[test]
    fn fallback_exact_match_scores_100() {
        let verdict = fallback_verdict("SHIP", "SHIP");
        assert_eq!(verdict.similarity, 100);
        assert!(verdict.is_valid_word);
    }

    #[test]
    fn fallback_rejects_implausible_words() {
        // Too short
        assert!(!fallback_verdict("AB", "SHIP").is_valid_word);
        // No vowel
        assert!(!fallback_verdict("BCDFG", "SHIP").is_valid_word);
        // Triple consonant run
        assert!(!fallback_verdict("ABCDE", "SHIP").is_valid_word);
    }

    #[test]
    fn fallback_accepts_y_as_vowel() {
        assert!(fallback_verdict("MYTH", "SHIP").is_valid_word);
    }

    #[test]
    fn fallback_accepts_ordinary_words() {
        for word in ["TABLE", "FOX", "QUEEN", "ECHO"] {
            assert!(fallback_verdict(word, "SHIP").is_valid_word, "{word}");
        }
    }
}
