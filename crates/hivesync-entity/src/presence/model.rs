//! User and hive presence models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use hivesync_core::types::{HiveId, UserId};

use super::activity::ActivityDescriptor;
use super::status::PresenceStatus;

/// Classifier for the device a presence state originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Desktop application.
    Desktop,
    /// Mobile application.
    Mobile,
    /// Browser tab.
    Web,
    /// Origin not reported.
    #[default]
    Unknown,
}

/// Last-known presence of a single user.
///
/// `last_seen` is monotonically non-decreasing within a cache entry; the
/// cache enforces this when folding in updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPresence {
    /// User this presence belongs to.
    pub user_id: UserId,
    /// Availability status.
    pub status: PresenceStatus,
    /// Structured descriptor of the current activity, if any.
    pub activity: Option<ActivityDescriptor>,
    /// When the user was last seen.
    pub last_seen: DateTime<Utc>,
    /// Device the state originates from.
    #[serde(default)]
    pub device: DeviceKind,
    /// Hive the user is currently active in, if any.
    #[serde(default)]
    pub current_hive_id: Option<HiveId>,
}

impl UserPresence {
    /// Presence with status `offline` and `last_seen` of now.
    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            activity: None,
            last_seen: Utc::now(),
            device: DeviceKind::Unknown,
            current_hive_id: None,
        }
    }

    /// Whether `last_seen` falls within the heartbeat-timeout window.
    ///
    /// A status other than `offline` is only trustworthy while this holds.
    pub fn is_live(&self, heartbeat_timeout: std::time::Duration) -> bool {
        let window = Duration::from_std(heartbeat_timeout).unwrap_or(Duration::seconds(60));
        Utc::now() - self.last_seen <= window
    }
}

/// Aggregate presence view for a hive.
///
/// Counts are always derived from `active_users` via the accessor methods,
/// never stored, so they cannot drift from the member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HivePresence {
    /// Hive this view describes.
    pub hive_id: HiveId,
    /// Presences of members currently active in the hive.
    pub active_users: Vec<UserPresence>,
    /// When this view was last updated.
    pub last_updated: DateTime<Utc>,
}

impl HivePresence {
    /// Empty view for a hive, updated now.
    pub fn empty(hive_id: HiveId) -> Self {
        Self {
            hive_id,
            active_users: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Number of members with status `online`.
    pub fn online_count(&self) -> usize {
        self.count_with(PresenceStatus::Online)
    }

    /// Number of members with status `away`.
    pub fn away_count(&self) -> usize {
        self.count_with(PresenceStatus::Away)
    }

    /// Number of members with status `busy`.
    pub fn busy_count(&self) -> usize {
        self.count_with(PresenceStatus::Busy)
    }

    fn count_with(&self, status: PresenceStatus) -> usize {
        self.active_users
            .iter()
            .filter(|p| p.status == status)
            .count()
    }
}
