//! Versioned player-document persistence
//!
//! The player document is the only genuinely shared mutable resource in the
//! engine, and the only place a race is possible: two devices finishing the
//! same player's game concurrently. The store contract closes it with a
//! compare-and-swap, retried a bounded number of times; exhausting the bound
//! is surfaced, since silently dropping a game result would corrupt the
//! statistics.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tracing::warn;

use super::PlayerDocument;

/// Attempts before a conflicted update is surfaced as an error
pub const MAX_UPDATE_RETRIES: u32 = 5;

/// A document snapshot with its storage version
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Error type for player-document persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The document changed between read and write
    Conflict,
    /// The conflict retry bound was exhausted
    RetriesExhausted(u32),
    /// The backing store itself failed
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "Player document changed concurrently"),
            Self::RetriesExhausted(n) => {
                write!(f, "Player update still conflicted after {n} attempts")
            }
            Self::Backend(msg) => write!(f, "Player store failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable per-player document storage with conditional writes
pub trait PlayerStore {
    /// Load a player's document with its version; players never seen before
    /// read as a defaulted document at version 0
    fn load(&self, player_id: &str) -> Result<Versioned<PlayerDocument>, StoreError>;

    /// Write `value` only if the stored version still equals
    /// `expected_version`; otherwise fail with [`StoreError::Conflict`]
    fn compare_and_swap(
        &self,
        player_id: &str,
        expected_version: u64,
        value: PlayerDocument,
    ) -> Result<(), StoreError>;
}

/// Read-modify-write under the CAS discipline
///
/// Returns the snapshot the transition was applied to and the written result.
/// `apply` must be pure over the snapshot it is given; it may run more than
/// once when the write conflicts.
pub fn update_with_retry<S, F>(
    store: &S,
    player_id: &str,
    mut apply: F,
) -> Result<(PlayerDocument, PlayerDocument), StoreError>
where
    S: PlayerStore + ?Sized,
    F: FnMut(&PlayerDocument) -> PlayerDocument,
{
    for attempt in 0..MAX_UPDATE_RETRIES {
        let current = store.load(player_id)?;
        let next = apply(&current.value);

        match store.compare_and_swap(player_id, current.version, next.clone()) {
            Ok(()) => return Ok((current.value, next)),
            Err(StoreError::Conflict) => {
                warn!(player_id, attempt, "player document write conflicted, retrying");
            }
            Err(err) => return Err(err),
        }
    }

    Err(StoreError::RetriesExhausted(MAX_UPDATE_RETRIES))
}

/// In-memory store for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    inner: Mutex<FxHashMap<String, Versioned<PlayerDocument>>>,
}

impl MemoryPlayerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all documents, unordered
    #[must_use]
    pub fn documents(&self) -> Vec<(String, PlayerDocument)> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn load(&self, player_id: &str) -> Result<Versioned<PlayerDocument>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.get(player_id).cloned().unwrap_or(Versioned {
            version: 0,
            value: PlayerDocument::default(),
        }))
    }

    fn compare_and_swap(
        &self,
        player_id: &str,
        expected_version: u64,
        value: PlayerDocument,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let current_version = inner.get(player_id).map_or(0, |v| v.version);

        if current_version != expected_version {
            return Err(StoreError::Conflict);
        }

        inner.insert(
            player_id.to_string(),
            Versioned {
                version: current_version + 1,
                value,
            },
        );
        Ok(())
    }
}
