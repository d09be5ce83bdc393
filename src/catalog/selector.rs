//! Daily word selection
//!
//! Maps a calendar date to a catalog index: whole UTC days elapsed since the
//! epoch date, absolute value, modulo catalog length. Deterministic for the
//! lifetime of a fixed catalog and epoch, and total over any finite date.
//! Dates before the epoch are treated symmetrically rather than rejected.

use time::{Date, OffsetDateTime, macros::date};

use super::WordCatalog;
use crate::core::Word;

/// First puzzle day; day N's word is `catalog[N mod catalog.len()]`
pub const PUZZLE_EPOCH: Date = date!(2025 - 11 - 28);

/// How far a client-supplied date may differ from the server's own UTC date
/// before it is ignored (midnight clock-skew allowance)
pub const MAX_CLIENT_DATE_SKEW_DAYS: i64 = 1;

/// Get the secret word for a calendar date
///
/// Pure and total: the same (catalog, epoch, date) always yields the same
/// word, and `date + catalog.len()` days wraps around to the same word.
///
/// # Examples
/// ```
/// use proxle_engine::catalog::{PUZZLE_EPOCH, WordCatalog, word_for_date};
/// use time::macros::date;
///
/// let catalog = WordCatalog::embedded();
/// let word = word_for_date(catalog, PUZZLE_EPOCH, date!(2025 - 11 - 28));
/// assert_eq!(word.text(), "PIECE");
/// ```
#[must_use]
pub fn word_for_date<'a>(catalog: &'a WordCatalog, epoch: Date, date: Date) -> &'a Word {
    let elapsed_days = (date - epoch).whole_days().unsigned_abs();
    let index = (elapsed_days % catalog.len() as u64) as usize;
    catalog.word_at(index)
}

/// Current calendar day in UTC
#[must_use]
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Resolve the puzzle date from an advisory client-supplied date
///
/// The secret word must never be derivable from client-controlled wall-clock
/// time alone, so a requested date is honored only when it is within
/// [`MAX_CLIENT_DATE_SKEW_DAYS`] of the server's own date; otherwise the
/// server date wins.
#[must_use]
pub fn resolve_puzzle_date(requested: Option<Date>, server_today: Date) -> Date {
    match requested {
        Some(date) if (date - server_today).whole_days().abs() <= MAX_CLIENT_DATE_SKEW_DAYS => {
            date
        }
        _ => server_today,
    }
}
