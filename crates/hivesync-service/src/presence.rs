//! Presence mutation coordinator and cached read path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use hivesync_cache::PresenceStore;
use hivesync_client::PresenceApi;
use hivesync_core::error::ErrorKind;
use hivesync_core::result::AppResult;
use hivesync_core::types::{HiveId, UserId};
use hivesync_entity::presence::{
    HivePresence, PresenceStatus, PresenceUpdate, SetPresenceRequest, UserPresence,
};
use hivesync_entity::reporting::{PresenceHistoryEntry, PresenceStatistics};
use hivesync_realtime::channel::RealtimeChannel;
use hivesync_realtime::local::LocalPresence;
use hivesync_realtime::message::WireMessage;
use hivesync_realtime::{StatusSink, topic};

use crate::optimistic::OptimisticWrite;

/// Coordinates changes to this user's own presence and serves cached reads.
///
/// `set_presence` is the only path allowed to change the authoritative
/// local status; the heartbeat scheduler re-announces whatever this service
/// last set.
#[derive(Debug)]
pub struct PresenceService {
    api: Arc<dyn PresenceApi>,
    store: Arc<PresenceStore>,
    channel: Arc<dyn RealtimeChannel>,
    local: Arc<LocalPresence>,
    heartbeat_timeout: Duration,
}

impl PresenceService {
    pub fn new(
        api: Arc<dyn PresenceApi>,
        store: Arc<PresenceStore>,
        channel: Arc<dyn RealtimeChannel>,
        local: Arc<LocalPresence>,
        heartbeat_timeout: Duration,
    ) -> Self {
        Self {
            api,
            store,
            channel,
            local,
            heartbeat_timeout,
        }
    }

    /// Change this user's presence, optimistically.
    ///
    /// The new value is visible in the store before the remote call is
    /// made. On remote success the server-confirmed value replaces it and
    /// is broadcast to the user topic and every active hive topic; on
    /// failure the pre-mutation value is restored (or evicted when there
    /// was none) and the error propagates. No retries at this layer.
    pub async fn set_presence(&self, request: SetPresenceRequest) -> AppResult<UserPresence> {
        let user_id = self.local.user_id();
        let write = OptimisticWrite::begin(self.store.get_user(user_id));

        let provisional = UserPresence {
            user_id,
            status: request.status,
            activity: request.activity.clone(),
            last_seen: Utc::now(),
            device: request.device,
            current_hive_id: request
                .hive_id
                .or_else(|| write.snapshot().and_then(|p| p.current_hive_id)),
        };
        self.store.put_user(provisional);

        match self.api.set_presence(&request).await {
            Ok(confirmed) => {
                self.store.put_user(confirmed.clone());
                self.local.set_status(confirmed.status).await;
                self.local.set_activity(confirmed.activity.clone()).await;
                write.confirm();
                self.broadcast(PresenceUpdate {
                    user_id,
                    status: confirmed.status,
                    activity: confirmed.activity.clone(),
                    timestamp: confirmed.last_seen,
                })
                .await;
                Ok(confirmed)
            }
            Err(e) => {
                warn!(user_id = %user_id, "Presence mutation failed, rolling back: {e}");
                match write.rollback() {
                    Some(previous) => self.store.put_user(previous),
                    None => self.store.invalidate_user(user_id),
                }
                Err(e)
            }
        }
    }

    /// A user's presence, from the store when fresh, else from the API.
    ///
    /// A non-offline status is only trusted while `last_seen` falls inside
    /// the heartbeat-timeout window; past it the user reads as offline.
    /// A user the backend does not know reads as offline too.
    pub async fn get_user_presence(&self, user_id: UserId) -> AppResult<UserPresence> {
        if let Some(cached) = self.store.get_user(user_id) {
            return Ok(self.with_liveness(cached));
        }
        match self.api.get_user_presence(user_id).await {
            Ok(presence) => {
                self.store.put_user(presence.clone());
                Ok(self.with_liveness(presence))
            }
            Err(e) if e.kind == ErrorKind::NotFound => Ok(UserPresence::offline(user_id)),
            Err(e) => Err(e),
        }
    }

    /// A hive's aggregate presence, from the store when fresh, else from
    /// the API.
    pub async fn get_hive_presence(&self, hive_id: HiveId) -> AppResult<HivePresence> {
        if let Some(cached) = self.store.get_hive(hive_id) {
            return Ok(cached);
        }
        let presence = self.api.get_hive_presence(hive_id).await?;
        self.store.put_hive(presence.clone());
        Ok(presence)
    }

    /// Presence for many users at once. Always remote; results refresh the
    /// store.
    pub async fn get_bulk_presence(&self, user_ids: &[UserId]) -> AppResult<Vec<UserPresence>> {
        let presences = self.api.get_bulk_presence(user_ids).await?;
        for presence in &presences {
            self.store.put_user(presence.clone());
        }
        Ok(presences)
    }

    /// Read-only reporting passthrough.
    pub async fn get_statistics(&self, user_id: UserId) -> AppResult<PresenceStatistics> {
        self.api.get_statistics(user_id).await
    }

    /// Read-only reporting passthrough.
    pub async fn get_history(&self, user_id: UserId) -> AppResult<Vec<PresenceHistoryEntry>> {
        self.api.get_history(user_id).await
    }

    /// The store value for a user, with no remote fallback.
    pub fn cached_presence(&self, user_id: UserId) -> Option<UserPresence> {
        self.store.get_user(user_id)
    }

    fn with_liveness(&self, mut presence: UserPresence) -> UserPresence {
        if presence.status != PresenceStatus::Offline && !presence.is_live(self.heartbeat_timeout) {
            presence.status = PresenceStatus::Offline;
        }
        presence
    }

    async fn broadcast(&self, update: PresenceUpdate) {
        if !self.channel.is_connected() {
            debug!("Channel not connected; skipping presence broadcast");
            return;
        }
        let mut topics = vec![topic::user_presence(update.user_id)];
        for hive_id in self.local.active_hives().await {
            topics.push(topic::hive_presence(hive_id));
        }
        for name in topics {
            if let Err(e) = self
                .channel
                .publish(&name, WireMessage::PresenceUpdate(update.clone()))
                .await
            {
                debug!("Presence broadcast to '{name}' failed: {e}");
            }
        }
    }
}

#[async_trait]
impl StatusSink for PresenceService {
    /// Status transition requested by the auto-away detector.
    ///
    /// Fires from a timer with no caller to report to, so failures are
    /// logged and swallowed.
    async fn request_status(&self, status: PresenceStatus) {
        let request = SetPresenceRequest {
            status,
            activity: self.local.activity().await,
            device: self.local.device(),
            hive_id: None,
        };
        if let Err(e) = self.set_presence(request).await {
            warn!("Automatic status change to {status} failed: {e}");
        }
    }
}
