//! Guess evaluation and game completion entry points
//!
//! `GameService` is the composition root: a guess resolves today's secret,
//! runs the deterministic letter match, then consults the semantic oracle
//! (whose failure can only degrade the semantic channel, never the match).
//! A completed game drives the progression state machine under the store's
//! compare-and-swap discipline and then notifies the leaderboard
//! synchronizer; a sync failure is logged, never surfaced to the player.

use std::fmt;

use serde::Serialize;
use time::{Date, OffsetDateTime, macros::format_description};
use tracing::error;

use crate::catalog::{PUZZLE_EPOCH, WordCatalog, resolve_puzzle_date, today_utc, word_for_date};
use crate::core::{LetterStatus, match_pattern};
use crate::hints::{HintService, SemanticSource};
use crate::leaderboard::{LeaderboardStore, LeaderboardSynchronizer, PlayerDocumentChanged};
use crate::progress::store::{PlayerStore, StoreError, update_with_retry};
use crate::progress::{GameOutcome, PlayerDocument, PlayerProgress, apply_outcome};

/// Longest guess the game accepts
pub const MAX_GUESS_LEN: usize = 10;

/// Hint returned on an exact match, bypassing the oracle
pub const VICTORY_HINT: &str = "Victory!";

/// A guess submission
#[derive(Debug, Clone)]
pub struct SubmitGuess {
    pub player_id: String,
    pub guess: String,
    /// Hints already shown this game; the oracle must not repeat them
    pub previous_hints: Vec<String>,
    /// Advisory client date; validated against the server's own clock
    pub date: Option<Date>,
}

/// Everything the presentation layer needs to render one guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub is_valid_word: bool,
    pub similarity: u8,
    pub hint: String,
    pub letter_status: Vec<LetterStatus>,
    pub source: SemanticSource,
}

/// Error type for game operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Empty, oversized, or non-alphabetic guess
    InvalidGuess(String),
    /// A won game must report at least one guess
    InvalidGuessCount,
    /// Unparseable puzzle date
    MalformedDate(String),
    /// Persistence failure, including an exhausted conflict-retry bound
    Store(StoreError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGuess(reason) => write!(f, "Invalid guess: {reason}"),
            Self::InvalidGuessCount => write!(f, "A won game requires a positive guess count"),
            Self::MalformedDate(raw) => write!(f, "Malformed date '{raw}', expected YYYY-MM-DD"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Parse an ISO `YYYY-MM-DD` calendar date from a request
pub fn parse_puzzle_date(raw: &str) -> Result<Date, GameError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw, format).map_err(|_| GameError::MalformedDate(raw.to_string()))
}

/// Validate and normalize a raw guess
fn validate_guess(raw: &str) -> Result<String, GameError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(GameError::InvalidGuess("guess is empty".to_string()));
    }
    if trimmed.len() > MAX_GUESS_LEN {
        return Err(GameError::InvalidGuess(format!(
            "guess exceeds {MAX_GUESS_LEN} letters"
        )));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(GameError::InvalidGuess(
            "guess must contain only letters".to_string(),
        ));
    }

    Ok(trimmed.to_uppercase())
}

/// The daily puzzle engine
pub struct GameService<P: PlayerStore, L: LeaderboardStore> {
    catalog: WordCatalog,
    epoch: Date,
    hints: HintService,
    players: P,
    leaderboard: LeaderboardSynchronizer<L>,
}

impl<P: PlayerStore, L: LeaderboardStore> GameService<P, L> {
    pub fn new(
        catalog: WordCatalog,
        hints: HintService,
        players: P,
        leaderboard: LeaderboardSynchronizer<L>,
    ) -> Self {
        Self {
            catalog,
            epoch: PUZZLE_EPOCH,
            hints,
            players,
            leaderboard,
        }
    }

    /// Override the puzzle epoch (tests, staging catalogs)
    #[must_use]
    pub fn with_epoch(mut self, epoch: Date) -> Self {
        self.epoch = epoch;
        self
    }

    /// The player-document store
    pub fn players(&self) -> &P {
        &self.players
    }

    /// The leaderboard synchronizer
    pub fn leaderboard(&self) -> &LeaderboardSynchronizer<L> {
        &self.leaderboard
    }

    /// The secret word for a calendar date
    #[must_use]
    pub fn secret_for_date(&self, date: Date) -> &str {
        word_for_date(&self.catalog, self.epoch, date).text()
    }

    /// Evaluate one guess against today's secret
    ///
    /// The letter match is computed and returned regardless of the oracle's
    /// availability; only the semantic channel can degrade. No state is
    /// mutated.
    pub fn submit_guess(&self, request: &SubmitGuess) -> Result<GuessResponse, GameError> {
        self.submit_guess_at(request, today_utc())
    }

    /// Evaluate one guess with an explicit server date
    pub fn submit_guess_at(
        &self,
        request: &SubmitGuess,
        server_today: Date,
    ) -> Result<GuessResponse, GameError> {
        let guess = validate_guess(&request.guess)?;

        let date = resolve_puzzle_date(request.date, server_today);
        let secret = word_for_date(&self.catalog, self.epoch, date);

        let letter_status = match_pattern(&guess, secret.text());

        // Exact win bypasses the oracle entirely
        if guess == secret.text() {
            return Ok(GuessResponse {
                is_valid_word: true,
                similarity: 100,
                hint: VICTORY_HINT.to_string(),
                letter_status,
                source: SemanticSource::Exact,
            });
        }

        let verdict = self
            .hints
            .evaluate(&guess, secret.text(), &request.previous_hints);

        Ok(GuessResponse {
            is_valid_word: verdict.is_valid_word,
            similarity: verdict.similarity,
            hint: verdict.hint,
            letter_status,
            source: verdict.source,
        })
    }

    /// Record one finished game for a player
    ///
    /// Must be called at most once per finished game; the progression
    /// engine's same-day guard keeps a duplicate call from corrupting the
    /// streak, but counts will still inflate.
    pub fn complete_game(
        &self,
        player_id: &str,
        won: bool,
        guess_count: u32,
    ) -> Result<PlayerProgress, GameError> {
        self.complete_game_at(player_id, won, guess_count, OffsetDateTime::now_utc())
    }

    /// Record one finished game with an explicit completion instant
    pub fn complete_game_at(
        &self,
        player_id: &str,
        won: bool,
        guess_count: u32,
        now: OffsetDateTime,
    ) -> Result<PlayerProgress, GameError> {
        if won && guess_count == 0 {
            return Err(GameError::InvalidGuessCount);
        }

        let outcome = GameOutcome { won, guess_count };
        let (before, after) = update_with_retry(&self.players, player_id, |doc| {
            let mut next = doc.clone();
            next.progress = apply_outcome(&doc.progress, outcome, now);
            next
        })?;

        self.notify_leaderboard(player_id, Some(before), Some(after.clone()), now);
        Ok(after.progress)
    }

    /// Apply an arbitrary document mutation (preference edits, donation
    /// credits) under the same CAS discipline, keeping the public
    /// leaderboard in sync
    pub fn update_player<F>(
        &self,
        player_id: &str,
        mutate: F,
    ) -> Result<PlayerDocument, GameError>
    where
        F: FnMut(&PlayerDocument) -> PlayerDocument,
    {
        self.update_player_at(player_id, mutate, OffsetDateTime::now_utc())
    }

    /// [`Self::update_player`] with an explicit change instant
    pub fn update_player_at<F>(
        &self,
        player_id: &str,
        mutate: F,
        now: OffsetDateTime,
    ) -> Result<PlayerDocument, GameError>
    where
        F: FnMut(&PlayerDocument) -> PlayerDocument,
    {
        let (before, after) = update_with_retry(&self.players, player_id, mutate)?;
        self.notify_leaderboard(player_id, Some(before), Some(after.clone()), now);
        Ok(after)
    }

    /// Fire the document-change event; sync failures never block the write
    /// that triggered them, the synchronizer converges on a later change
    fn notify_leaderboard(
        &self,
        player_id: &str,
        before: Option<PlayerDocument>,
        after: Option<PlayerDocument>,
        now: OffsetDateTime,
    ) {
        let event = PlayerDocumentChanged {
            player_id: player_id.to_string(),
            before,
            after,
        };

        if let Err(err) = self.leaderboard.handle_change_at(&event, now) {
            error!(player_id, %err, "leaderboard sync failed, will retry on next change");
        }
    }
}
