//! Read-only reporting DTOs served by the presence backend.
//!
//! Consumed as-is; the engine performs no logic on these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hivesync_core::types::UserId;

use crate::presence::PresenceStatus;

/// Aggregated presence statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceStatistics {
    /// User the statistics describe.
    pub user_id: UserId,
    /// Total seconds spent online in the reporting window.
    pub online_seconds: u64,
    /// Total seconds spent focusing in the reporting window.
    pub focusing_seconds: u64,
    /// Number of completed focus sessions.
    pub focus_sessions: u32,
    /// Start of the reporting window.
    pub window_start: DateTime<Utc>,
    /// End of the reporting window.
    pub window_end: DateTime<Utc>,
}

/// One historical presence transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceHistoryEntry {
    /// Status entered.
    pub status: PresenceStatus,
    /// When the status was entered.
    pub entered_at: DateTime<Utc>,
    /// When the status was left, if it has been.
    pub left_at: Option<DateTime<Utc>>,
}
