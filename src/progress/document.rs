//! The private per-player document
//!
//! One document per player: cumulative statistics plus leaderboard
//! preferences and supporter state. Statistics are mutated exclusively by the
//! progression engine; donation totals are owned by the payment-webhook
//! collaborator, which must never alter the streak or game fields.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::PlayerProgress;

/// Moderation state of a supporter message or alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Supporter contribution totals, owned by the payment-webhook collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Donations {
    pub total: f64,
    pub count: u32,
}

/// Progress plus leaderboard preferences: the full player document
///
/// Preference fields are optional on the wire; consumers apply defaults once
/// at their own boundary (see the leaderboard projection) rather than
/// null-checking throughout business logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerDocument {
    #[serde(flatten)]
    pub progress: PlayerProgress,

    pub display_on_leaderboard: Option<bool>,
    pub leaderboard_name: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub show_donation_amount: Option<bool>,
    pub show_streak: Option<bool>,
    pub message: Option<String>,
    pub message_approval_status: Option<ApprovalStatus>,
    pub donations: Option<Donations>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_active_at: Option<OffsetDateTime>,
}
