//! Presence update events and mutation requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hivesync_core::types::{HiveId, UserId};

use super::activity::ActivityDescriptor;
use super::model::{DeviceKind, UserPresence};
use super::status::PresenceStatus;

/// An observed presence change for one user.
///
/// Ephemeral: folded into the cached [`UserPresence`] and then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    /// User whose presence changed.
    pub user_id: UserId,
    /// New status.
    pub status: PresenceStatus,
    /// New activity, if reported.
    pub activity: Option<ActivityDescriptor>,
    /// When the change happened at its origin.
    pub timestamp: DateTime<Utc>,
}

impl PresenceUpdate {
    /// Build the presence value this update resolves to, folding into an
    /// existing entry when one is present.
    ///
    /// `last_seen` never goes backwards: the result carries the later of the
    /// update timestamp and the previous `last_seen`.
    pub fn fold_into(&self, previous: Option<&UserPresence>) -> UserPresence {
        let last_seen = match previous {
            Some(prev) => self.timestamp.max(prev.last_seen),
            None => self.timestamp,
        };
        UserPresence {
            user_id: self.user_id,
            status: self.status,
            activity: self.activity.clone(),
            last_seen,
            device: previous.map(|p| p.device).unwrap_or_default(),
            current_hive_id: previous.and_then(|p| p.current_hive_id),
        }
    }
}

/// Request body for `PUT /presence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPresenceRequest {
    /// Desired status.
    pub status: PresenceStatus,
    /// Desired activity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityDescriptor>,
    /// Device the request originates from.
    #[serde(default)]
    pub device: DeviceKind,
    /// Hive the user considers current, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hive_id: Option<HiveId>,
}

impl SetPresenceRequest {
    /// Request carrying only a status change.
    pub fn status(status: PresenceStatus) -> Self {
        Self {
            status,
            activity: None,
            device: DeviceKind::default(),
            hive_id: None,
        }
    }
}
