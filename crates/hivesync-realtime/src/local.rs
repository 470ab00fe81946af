//! Locally tracked presence state for this client.

use std::collections::HashSet;

use chrono::Utc;
use tokio::sync::RwLock;

use hivesync_core::types::{HiveId, UserId};
use hivesync_entity::presence::{
    ActivityDescriptor, DeviceKind, PresenceHeartbeat, PresenceStatus,
};

/// The status, activity, and active hive set this client announces about
/// itself.
///
/// Written only by the mutation coordinator (status/activity) and the host
/// application (hive set); the heartbeat scheduler and auto-away detector
/// read it.
#[derive(Debug)]
pub struct LocalPresence {
    user_id: UserId,
    device: DeviceKind,
    status: RwLock<PresenceStatus>,
    activity: RwLock<Option<ActivityDescriptor>>,
    active_hives: RwLock<HashSet<HiveId>>,
}

impl LocalPresence {
    /// Fresh local state, starting `online`.
    pub fn new(user_id: UserId, device: DeviceKind) -> Self {
        Self {
            user_id,
            device,
            status: RwLock::new(PresenceStatus::Online),
            activity: RwLock::new(None),
            active_hives: RwLock::new(HashSet::new()),
        }
    }

    /// The user this client announces for.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The device classifier announced by this client.
    pub fn device(&self) -> DeviceKind {
        self.device
    }

    /// Current local status.
    pub async fn status(&self) -> PresenceStatus {
        *self.status.read().await
    }

    /// Replace the local status.
    pub async fn set_status(&self, status: PresenceStatus) {
        *self.status.write().await = status;
    }

    /// Current local activity.
    pub async fn activity(&self) -> Option<ActivityDescriptor> {
        self.activity.read().await.clone()
    }

    /// Replace the local activity.
    pub async fn set_activity(&self, activity: Option<ActivityDescriptor>) {
        *self.activity.write().await = activity;
    }

    /// Mark a hive as active for this client.
    pub async fn add_active_hive(&self, hive_id: HiveId) {
        self.active_hives.write().await.insert(hive_id);
    }

    /// Remove a hive from the active set.
    pub async fn remove_active_hive(&self, hive_id: HiveId) {
        self.active_hives.write().await.remove(&hive_id);
    }

    /// Replace the active hive set.
    pub async fn set_active_hives(&self, hive_ids: impl IntoIterator<Item = HiveId>) {
        *self.active_hives.write().await = hive_ids.into_iter().collect();
    }

    /// Snapshot of the active hive set.
    pub async fn active_hives(&self) -> Vec<HiveId> {
        self.active_hives.read().await.iter().copied().collect()
    }

    /// Build a heartbeat from the current local state, stamped now.
    pub async fn heartbeat(&self) -> PresenceHeartbeat {
        PresenceHeartbeat {
            user_id: self.user_id,
            hive_ids: self.active_hives().await,
            status: self.status().await,
            activity: self.activity().await,
            timestamp: Utc::now(),
        }
    }
}
