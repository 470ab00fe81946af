//! Ephemeral shared-activity sessions layered on presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hivesync_core::types::{CollabSessionId, HiveId, UserId};

use crate::presence::ActivityKind;

/// Phase of a shared activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Session is running.
    Active,
    /// Session is paused by a participant.
    Paused,
    /// Session finished or was terminated.
    Completed,
}

/// The activity shared by all participants of a collaboration session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedActivity {
    /// Activity category.
    pub kind: ActivityKind,
    /// Current phase.
    pub phase: SessionPhase,
    /// Planned duration in minutes.
    pub duration_minutes: u32,
}

/// Caller-supplied description of the activity to share when creating a
/// session. The server assigns IDs, phase, and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedActivitySpec {
    /// Activity category.
    pub kind: ActivityKind,
    /// Planned duration in minutes.
    pub duration_minutes: u32,
}

/// Server-owned record of an ephemeral shared-activity session.
///
/// Membership is authoritative on the server; the engine never maintains
/// optimistic participant state. Not replicated through the presence cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationSession {
    /// Unique session identifier.
    pub session_id: CollabSessionId,
    /// Hive the session belongs to.
    pub hive_id: HiveId,
    /// Current participants.
    pub participants: Vec<UserId>,
    /// The shared activity.
    pub shared_activity: SharedActivity,
    /// User who created the session.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
