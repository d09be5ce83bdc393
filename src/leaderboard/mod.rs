//! Public leaderboard denormalization
//!
//! The public leaderboard collection is a read-optimized *view* of private
//! player documents, never a source of truth. Whenever a player document
//! changes, the synchronizer recomputes that player's public entry from
//! scratch and applies it: opted-out players get their entry deleted,
//! opted-in players get a merge-upsert stamped with an update time.
//!
//! The whole path is idempotent and last-writer-wins per player, so retries
//! and reordering under partial failure converge to the latest source state.
//! Nothing else may write the public collection.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::progress::{ApprovalStatus, PlayerDocument};

/// Display name used when a player opted in without choosing one
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// One public, denormalized leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub photo_url: Option<String>,
    /// Supporter contribution total
    pub amount: f64,
    pub current_streak: u32,
    /// Visibility flags: opt-in to the board, opt-out of specific fields
    pub show_donation_amount: bool,
    pub show_streak: bool,
    pub message: Option<String>,
    pub approval_status: ApprovalStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_active_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A change to a player's document, as delivered by the persistence layer
///
/// `after` is `None` when the document was deleted outright. Decouples the
/// synchronizer from any particular persistence technology.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDocumentChanged {
    pub player_id: String,
    pub before: Option<PlayerDocument>,
    pub after: Option<PlayerDocument>,
}

/// Error type for leaderboard persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    Backend(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "Leaderboard store failure: {msg}"),
        }
    }
}

impl std::error::Error for SyncError {}

/// Public leaderboard collection, keyed by player id
pub trait LeaderboardStore {
    fn get(&self, player_id: &str) -> Result<Option<LeaderboardEntry>, SyncError>;
    fn upsert(&self, player_id: &str, entry: LeaderboardEntry) -> Result<(), SyncError>;
    /// Deleting an absent entry is a no-op, not an error
    fn delete(&self, player_id: &str) -> Result<(), SyncError>;
}

/// Compute a player's public entry from their private document
///
/// Returns `None` when the player has not opted in. Name falls back through
/// leaderboard alias, then account display name, then [`ANONYMOUS_NAME`].
/// Boolean visibility flags default to `true` when unset.
#[must_use]
pub fn project_entry(doc: &PlayerDocument, now: OffsetDateTime) -> Option<LeaderboardEntry> {
    if !doc.display_on_leaderboard.unwrap_or(false) {
        return None;
    }

    let display_name = doc
        .leaderboard_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| {
            doc.display_name
                .clone()
                .filter(|name| !name.trim().is_empty())
        })
        .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

    Some(LeaderboardEntry {
        display_name,
        photo_url: doc.photo_url.clone(),
        amount: doc.donations.map_or(0.0, |d| d.total),
        current_streak: doc.progress.current_streak,
        show_donation_amount: doc.show_donation_amount.unwrap_or(true),
        show_streak: doc.show_streak.unwrap_or(true),
        message: doc.message.clone(),
        approval_status: doc.message_approval_status.unwrap_or_default(),
        last_active_at: doc.last_active_at.or(Some(now)),
        updated_at: now,
    })
}

/// Applies player-document changes to the public collection
pub struct LeaderboardSynchronizer<S: LeaderboardStore> {
    store: S,
}

impl<S: LeaderboardStore> LeaderboardSynchronizer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying public collection
    pub fn store(&self) -> &S {
        &self.store
    }

    /// React to one document change, stamping entries with the current time
    pub fn handle_change(&self, event: &PlayerDocumentChanged) -> Result<(), SyncError> {
        self.handle_change_at(event, OffsetDateTime::now_utc())
    }

    /// React to one document change with an explicit stamp
    ///
    /// Idempotent: the same event and stamp always produce the same public
    /// state. Per-player convergence is last-writer-wins on `updated_at`, so
    /// a stale event replayed after a newer one is a no-op.
    pub fn handle_change_at(
        &self,
        event: &PlayerDocumentChanged,
        now: OffsetDateTime,
    ) -> Result<(), SyncError> {
        let player_id = event.player_id.as_str();

        let Some(entry) = event.after.as_ref().and_then(|doc| project_entry(doc, now)) else {
            info!(player_id, "player not on leaderboard, removing entry");
            return self.store.delete(player_id);
        };

        if let Some(existing) = self.store.get(player_id)? {
            if existing.updated_at > entry.updated_at {
                warn!(player_id, "stale leaderboard update ignored");
                return Ok(());
            }
        }

        info!(
            player_id,
            display_name = %entry.display_name,
            streak = entry.current_streak,
            amount = entry.amount,
            "syncing leaderboard entry"
        );
        self.store.upsert(player_id, entry)
    }
}

/// In-memory public collection for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    inner: Mutex<FxHashMap<String, LeaderboardEntry>>,
}

impl MemoryLeaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, unordered
    #[must_use]
    pub fn entries(&self) -> Vec<(String, LeaderboardEntry)> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn get(&self, player_id: &str) -> Result<Option<LeaderboardEntry>, SyncError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.get(player_id).cloned())
    }

    fn upsert(&self, player_id: &str, entry: LeaderboardEntry) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.insert(player_id.to_string(), entry);
        Ok(())
    }

    fn delete(&self, player_id: &str) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.remove(player_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Donations, PlayerProgress};
    use time::macros::datetime;

    fn opted_in_doc() -> PlayerDocument {
        PlayerDocument {
            display_on_leaderboard: Some(true),
            leaderboard_name: Some("WordNerd".to_string()),
            display_name: Some("Alice A.".to_string()),
            donations: Some(Donations {
                total: 25.0,
                count: 2,
            }),
            progress: PlayerProgress {
                current_streak: 7,
                ..PlayerProgress::default()
            },
            ..PlayerDocument::default()
        }
    }

    fn change(player_id: &str, after: Option<PlayerDocument>) -> PlayerDocumentChanged {
        PlayerDocumentChanged {
            player_id: player_id.to_string(),
            before: None,
            after,
        }
    }

    const NOW: OffsetDateTime = datetime!(2026-02-01 12:00 UTC);

    #[test]
    fn opted_out_player_projects_nothing() {
        let mut doc = opted_in_doc();
        doc.display_on_leaderboard = Some(false);
        assert_eq!(project_entry(&doc, NOW), None);

        doc.display_on_leaderboard = None;
        assert_eq!(project_entry(&doc, NOW), None);
    }

    #[test]
    fn projection_copies_source_fields() {
        let entry = project_entry(&opted_in_doc(), NOW).unwrap();

        assert_eq!(entry.display_name, "WordNerd");
        assert_eq!(entry.amount, 25.0);
        assert_eq!(entry.current_streak, 7);
        assert_eq!(entry.updated_at, NOW);
    }

    #[test]
    fn name_falls_back_through_alias_then_account_then_anonymous() {
        let mut doc = opted_in_doc();
        doc.leaderboard_name = None;
        assert_eq!(project_entry(&doc, NOW).unwrap().display_name, "Alice A.");

        doc.display_name = None;
        assert_eq!(
            project_entry(&doc, NOW).unwrap().display_name,
            ANONYMOUS_NAME
        );

        // Whitespace-only aliases don't count
        doc.leaderboard_name = Some("   ".to_string());
        assert_eq!(
            project_entry(&doc, NOW).unwrap().display_name,
            ANONYMOUS_NAME
        );
    }

    #[test]
    fn visibility_flags_default_to_true() {
        let entry = project_entry(&opted_in_doc(), NOW).unwrap();
        assert!(entry.show_donation_amount);
        assert!(entry.show_streak);

        let mut doc = opted_in_doc();
        doc.show_donation_amount = Some(false);
        let entry = project_entry(&doc, NOW).unwrap();
        assert!(!entry.show_donation_amount);
        assert!(entry.show_streak);
    }

    #[test]
    fn message_status_defaults_to_pending() {
        let entry = project_entry(&opted_in_doc(), NOW).unwrap();
        assert_eq!(entry.approval_status, ApprovalStatus::Pending);
    }

    #[test]
    fn missing_donations_read_as_zero() {
        let mut doc = opted_in_doc();
        doc.donations = None;
        assert_eq!(project_entry(&doc, NOW).unwrap().amount, 0.0);
    }

    #[test]
    fn entry_serializes_wire_field_names() {
        let entry = project_entry(&opted_in_doc(), NOW).unwrap();
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["displayName"], "WordNerd");
        assert_eq!(json["showDonationAmount"], true);
        assert_eq!(json["approvalStatus"], "pending");
        assert_eq!(json["currentStreak"], 7);
    }

    #[test]
    fn sync_upserts_opted_in_player() {
        let sync = LeaderboardSynchronizer::new(MemoryLeaderboard::new());
        sync.handle_change_at(&change("alice", Some(opted_in_doc())), NOW)
            .unwrap();

        let entry = sync.store().get("alice").unwrap().unwrap();
        assert_eq!(entry.display_name, "WordNerd");
    }

    #[test]
    fn sync_is_idempotent() {
        let sync = LeaderboardSynchronizer::new(MemoryLeaderboard::new());
        let event = change("alice", Some(opted_in_doc()));

        sync.handle_change_at(&event, NOW).unwrap();
        let first = sync.store().get("alice").unwrap();

        sync.handle_change_at(&event, NOW).unwrap();
        let second = sync.store().get("alice").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn sync_removes_entry_on_opt_out() {
        let sync = LeaderboardSynchronizer::new(MemoryLeaderboard::new());
        sync.handle_change_at(&change("alice", Some(opted_in_doc())), NOW)
            .unwrap();

        let mut doc = opted_in_doc();
        doc.display_on_leaderboard = Some(false);
        sync.handle_change_at(&change("alice", Some(doc)), NOW + time::Duration::minutes(1))
            .unwrap();

        assert_eq!(sync.store().get("alice").unwrap(), None);
    }

    #[test]
    fn sync_removes_entry_on_document_delete() {
        let sync = LeaderboardSynchronizer::new(MemoryLeaderboard::new());
        sync.handle_change_at(&change("alice", Some(opted_in_doc())), NOW)
            .unwrap();
        sync.handle_change_at(&change("alice", None), NOW).unwrap();
        assert_eq!(sync.store().get("alice").unwrap(), None);
    }

    #[test]
    fn sync_for_never_synced_opted_out_player_is_noop() {
        let sync = LeaderboardSynchronizer::new(MemoryLeaderboard::new());
        let mut doc = opted_in_doc();
        doc.display_on_leaderboard = None;

        sync.handle_change_at(&change("bob", Some(doc)), NOW).unwrap();
        assert_eq!(sync.store().get("bob").unwrap(), None);
    }

    #[test]
    fn stale_update_does_not_overwrite_newer_entry() {
        let sync = LeaderboardSynchronizer::new(MemoryLeaderboard::new());

        let mut newer = opted_in_doc();
        newer.leaderboard_name = Some("NewName".to_string());
        sync.handle_change_at(&change("alice", Some(newer)), NOW).unwrap();

        // An event from a minute earlier arrives late
        let mut older = opted_in_doc();
        older.leaderboard_name = Some("OldName".to_string());
        sync.handle_change_at(
            &change("alice", Some(older)),
            NOW - time::Duration::minutes(1),
        )
        .unwrap();

        let entry = sync.store().get("alice").unwrap().unwrap();
        assert_eq!(entry.display_name, "NewName");
        assert_eq!(entry.updated_at, NOW);
    }

    #[test]
    fn retry_after_failure_converges() {
        /// Store whose first upsert fails
        struct FlakyBoard {
            inner: MemoryLeaderboard,
            failed_once: Mutex<bool>,
        }

        impl LeaderboardStore for FlakyBoard {
            fn get(&self, player_id: &str) -> Result<Option<LeaderboardEntry>, SyncError> {
                self.inner.get(player_id)
            }

            fn upsert(&self, player_id: &str, entry: LeaderboardEntry) -> Result<(), SyncError> {
                let mut failed = self.failed_once.lock().unwrap_or_else(PoisonError::into_inner);
                if !*failed {
                    *failed = true;
                    return Err(SyncError::Backend("transient".to_string()));
                }
                self.inner.upsert(player_id, entry)
            }

            fn delete(&self, player_id: &str) -> Result<(), SyncError> {
                self.inner.delete(player_id)
            }
        }

        let sync = LeaderboardSynchronizer::new(FlakyBoard {
            inner: MemoryLeaderboard::new(),
            failed_once: Mutex::new(false),
        });
        let event = change("alice", Some(opted_in_doc()));

        // First attempt fails; the source document is untouched, so the same
        // event is simply replayed
        assert!(sync.handle_change_at(&event, NOW).is_err());
        sync.handle_change_at(&event, NOW).unwrap();

        let entry = sync.store().get("alice").unwrap().unwrap();
        assert_eq!(entry.display_name, "WordNerd");
    }
}
