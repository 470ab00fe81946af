//! Presence store — TTL-bounded maps of last-known user and hive presence.

use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use hivesync_core::types::{HiveId, UserId};
use hivesync_entity::presence::{
    HivePresence, PresenceHeartbeat, PresenceStatus, PresenceUpdate, UserPresence,
};

use crate::entry::CacheEntry;

/// Time-bounded store of last-known presence, keyed by user and by hive.
///
/// Eviction is lazy: an expired entry is removed by the `get` that observes
/// it, there is no background sweeper. All merge operations run under the
/// per-key map lock, so the stale-rejection rule holds with concurrent
/// writers.
#[derive(Debug)]
pub struct PresenceStore {
    /// User ID → last-known user presence.
    users: DashMap<UserId, CacheEntry<UserPresence>>,
    /// Hive ID → last-known aggregate view.
    hives: DashMap<HiveId, CacheEntry<HivePresence>>,
    /// Entry TTL.
    ttl: Duration,
}

impl PresenceStore {
    /// Create a store with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            users: DashMap::new(),
            hives: DashMap::new(),
            ttl,
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a user's cached presence, evicting it first if it has expired.
    pub fn get_user(&self, user_id: UserId) -> Option<UserPresence> {
        self.users.remove_if(&user_id, |_, e| e.is_expired(self.ttl));
        self.users.get(&user_id).map(|e| e.value.clone())
    }

    /// Get a hive's cached aggregate view, evicting it first if expired.
    pub fn get_hive(&self, hive_id: HiveId) -> Option<HivePresence> {
        self.hives.remove_if(&hive_id, |_, e| e.is_expired(self.ttl));
        self.hives.get(&hive_id).map(|e| e.value.clone())
    }

    /// Store a user presence, replacing any previous entry.
    pub fn put_user(&self, presence: UserPresence) {
        self.users
            .insert(presence.user_id, CacheEntry::new(presence));
    }

    /// Store a hive aggregate view, replacing any previous entry.
    pub fn put_hive(&self, presence: HivePresence) {
        self.hives
            .insert(presence.hive_id, CacheEntry::new(presence));
    }

    /// Drop a user's entry.
    pub fn invalidate_user(&self, user_id: UserId) {
        self.users.remove(&user_id);
    }

    /// Drop a hive's entry.
    pub fn invalidate_hive(&self, hive_id: HiveId) {
        self.hives.remove(&hive_id);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.users.clear();
        self.hives.clear();
    }

    /// Merge an inbound update into the user map.
    ///
    /// Returns `false` when the update is older than the cached `last_seen`
    /// (stale-update rejection — normal convergence behavior, not a fault).
    pub fn apply_update(&self, update: &PresenceUpdate) -> bool {
        match self.users.entry(update.user_id) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get();
                let live = !current.is_expired(self.ttl);
                if live && update.timestamp < current.value.last_seen {
                    trace!(
                        user_id = %update.user_id,
                        update_ts = %update.timestamp,
                        cached_ts = %current.value.last_seen,
                        "Discarding stale presence update"
                    );
                    return false;
                }
                let previous = live.then(|| current.value.clone());
                occupied.insert(CacheEntry::new(update.fold_into(previous.as_ref())));
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(update.fold_into(None)));
                true
            }
        }
    }

    /// Fold the same update into a cached hive view, if one exists.
    ///
    /// An `offline` update removes the user from the active list; any other
    /// status replaces the user's element (or appends it when the user was
    /// not listed). Stale updates are rejected per member timestamp.
    pub fn apply_update_to_hive(&self, hive_id: HiveId, update: &PresenceUpdate) -> bool {
        let Some(mut entry) = self.hives.get_mut(&hive_id) else {
            return false;
        };
        if entry.value().is_expired(self.ttl) {
            drop(entry);
            self.hives.remove_if(&hive_id, |_, e| e.is_expired(self.ttl));
            return false;
        }

        let hive = &mut entry.value_mut().value;
        let position = hive
            .active_users
            .iter()
            .position(|p| p.user_id == update.user_id);

        match position {
            Some(idx) => {
                if update.timestamp < hive.active_users[idx].last_seen {
                    return false;
                }
                if update.status == PresenceStatus::Offline {
                    hive.active_users.remove(idx);
                } else {
                    let folded = update.fold_into(Some(&hive.active_users[idx]));
                    hive.active_users[idx] = folded;
                }
            }
            None => {
                if update.status == PresenceStatus::Offline {
                    return false;
                }
                hive.active_users.push(update.fold_into(None));
            }
        }
        hive.last_updated = Utc::now();
        true
    }

    /// Refresh a user's liveness from an inbound heartbeat.
    ///
    /// The sender's `last_seen` moves forward and its announced status and
    /// activity replace the cached ones; an older heartbeat is ignored.
    pub fn apply_heartbeat(&self, heartbeat: &PresenceHeartbeat) -> bool {
        let update = PresenceUpdate {
            user_id: heartbeat.user_id,
            status: heartbeat.status,
            activity: heartbeat.activity.clone(),
            timestamp: heartbeat.timestamp,
        };
        let applied = self.apply_update(&update);
        if applied {
            for hive_id in &heartbeat.hive_ids {
                self.apply_update_to_hive(*hive_id, &update);
            }
        }
        applied
    }
}
