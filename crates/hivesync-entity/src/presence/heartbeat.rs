//! Outbound liveness signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hivesync_core::types::{HiveId, UserId};

use super::activity::ActivityDescriptor;
use super::status::PresenceStatus;

/// Periodic liveness announcement produced by this client about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceHeartbeat {
    /// User announcing liveness.
    pub user_id: UserId,
    /// Hives the client currently considers active.
    pub hive_ids: Vec<HiveId>,
    /// Locally tracked status.
    pub status: PresenceStatus,
    /// Locally tracked activity, if any.
    pub activity: Option<ActivityDescriptor>,
    /// When the heartbeat was produced.
    pub timestamp: DateTime<Utc>,
}
