//! Player statistics and streak state machine
//!
//! One completed game per call drives a pure transition over a
//! [`PlayerProgress`] snapshot. This module performs no I/O; callers compose
//! it with the atomic read-modify-write in [`store`] so two devices finishing
//! the same player's game cannot silently lose an update.
//!
//! Day boundaries are always UTC-normalized calendar days. Comparing raw
//! instants (or local time) makes streaks break or extend across timezone
//! boundaries.

pub mod document;
pub mod store;

pub use document::{ApprovalStatus, Donations, PlayerDocument};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

/// Guess counts of 8 and above share one distribution bucket
pub const OVERFLOW_BUCKET: &str = "8+";

/// Durable per-player statistics document
///
/// Every field is defaulted on read so a partially-written or legacy document
/// still deserializes; business logic never needs to null-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProgress {
    pub total_games: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    /// Derived: round(100 * wins / games), 0 when no games
    pub win_rate: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    /// Semantically a day; compared at calendar-day granularity in UTC
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_played_date: Option<OffsetDateTime>,
    /// Win counts per guess-count bucket "1".."7", "8+"
    pub guess_distribution: BTreeMap<String, u32>,
}

/// One finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub won: bool,
    pub guess_count: u32,
}

/// Distribution bucket for a winning guess count
#[must_use]
pub fn bucket(guess_count: u32) -> String {
    if guess_count >= 8 {
        OVERFLOW_BUCKET.to_string()
    } else {
        guess_count.to_string()
    }
}

/// Apply one completed game to a progress snapshot
///
/// Streak rules on a win, by UTC day difference from the last play:
/// - first recorded play: streak becomes 1
/// - exactly one day: streak increments
/// - same day: streak unchanged (a duplicate completion must not
///   double-increment; callers shouldn't submit one, but it can't corrupt
///   state if they do)
/// - more than one day: streak resets to 1
///
/// A loss always resets the streak to 0. `last_played_date` is stamped with
/// `now` on every completion.
#[must_use]
pub fn apply_outcome(
    progress: &PlayerProgress,
    outcome: GameOutcome,
    now: OffsetDateTime,
) -> PlayerProgress {
    let mut next = progress.clone();

    next.total_games += 1;
    if outcome.won {
        next.total_wins += 1;
    } else {
        next.total_losses += 1;
    }
    next.win_rate = win_rate(next.total_wins, next.total_games);

    if outcome.won {
        next.current_streak = match progress.last_played_date {
            None => 1,
            Some(last) => match day_difference(last, now) {
                1 => progress.current_streak + 1,
                0 => progress.current_streak,
                _ => 1,
            },
        };
        next.max_streak = next.max_streak.max(next.current_streak);

        *next
            .guess_distribution
            .entry(bucket(outcome.guess_count))
            .or_insert(0) += 1;
    } else {
        next.current_streak = 0;
    }

    next.last_played_date = Some(now);
    next
}

/// Integer win percentage, rounded half away from zero
#[must_use]
pub fn win_rate(wins: u32, games: u32) -> u32 {
    if games == 0 {
        return 0;
    }
    (f64::from(wins) * 100.0 / f64::from(games)).round() as u32
}

/// Whole calendar days between two instants, both normalized to UTC midnight
fn day_difference(a: OffsetDateTime, b: OffsetDateTime) -> i64 {
    let a = a.to_offset(UtcOffset::UTC).date();
    let b = b.to_offset(UtcOffset::UTC).date();
    (b - a).whole_days().abs()
}
