//! The assembled presence engine.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use hivesync_cache::PresenceStore;
use hivesync_client::PresenceApi;
use hivesync_core::config::PresenceConfig;
use hivesync_core::types::{HiveId, UserId};
use hivesync_entity::presence::DeviceKind;
use hivesync_realtime::channel::RealtimeChannel;
use hivesync_realtime::{
    ActivityEvent, AutoAwayDetector, HeartbeatScheduler, LocalPresence, StatusSink, Subscription,
    SubscriptionManager, TimerRegistry, UpdateHandler, topic,
};

use crate::collaboration::CollaborationService;
use crate::presence::PresenceService;

/// One engine instance per process, constructed at application start and
/// passed by reference to every consumer.
///
/// Owns all shared state and background tasks; nothing in the engine relies
/// on process exit for teardown. Lifecycle is `start()` once, `cleanup()`
/// at shutdown (callable any number of times).
#[derive(Debug)]
pub struct PresenceEngine {
    config: PresenceConfig,
    store: Arc<PresenceStore>,
    channel: Arc<dyn RealtimeChannel>,
    local: Arc<LocalPresence>,
    timers: Arc<TimerRegistry>,
    heartbeat: Arc<HeartbeatScheduler>,
    autoaway: Arc<AutoAwayDetector>,
    subscriptions: Arc<SubscriptionManager>,
    presence: Arc<PresenceService>,
    collaboration: Arc<CollaborationService>,
}

impl PresenceEngine {
    /// Wire the engine together for one user and device.
    pub fn new(
        config: PresenceConfig,
        user_id: UserId,
        device: DeviceKind,
        api: Arc<dyn PresenceApi>,
        channel: Arc<dyn RealtimeChannel>,
    ) -> Self {
        let store = Arc::new(PresenceStore::new(Duration::from_secs(
            config.cache_ttl_seconds,
        )));
        let local = Arc::new(LocalPresence::new(user_id, device));
        let timers = Arc::new(TimerRegistry::new());

        let presence = Arc::new(PresenceService::new(
            Arc::clone(&api),
            Arc::clone(&store),
            Arc::clone(&channel),
            Arc::clone(&local),
            Duration::from_secs(config.heartbeat_timeout_seconds),
        ));
        let collaboration = Arc::new(CollaborationService::new(Arc::clone(&api)));
        let heartbeat = Arc::new(HeartbeatScheduler::new(
            Arc::clone(&channel),
            Arc::clone(&local),
            Arc::clone(&timers),
            Duration::from_secs(config.heartbeat_interval_seconds),
        ));
        let autoaway = Arc::new(AutoAwayDetector::new(
            Arc::clone(&presence) as Arc<dyn StatusSink>,
            Arc::clone(&local),
            Arc::clone(&timers),
            Duration::from_millis(config.auto_away_threshold_ms),
        ));
        let subscriptions = Arc::new(SubscriptionManager::new(
            Arc::clone(&channel),
            Arc::clone(&store),
        ));

        Self {
            config,
            store,
            channel,
            local,
            timers,
            heartbeat,
            autoaway,
            subscriptions,
            presence,
            collaboration,
        }
    }

    /// Start the heartbeat and arm auto-away detection.
    pub fn start(&self) {
        info!(user_id = %self.local.user_id(), "Starting presence engine");
        self.heartbeat.start();
        self.autoaway
            .enable(Duration::from_millis(self.config.auto_away_threshold_ms));
    }

    /// Subscribe a handler to one user's presence updates.
    pub fn subscribe_user(&self, user_id: UserId, handler: UpdateHandler) -> Subscription {
        self.subscriptions
            .subscribe(&topic::user_presence(user_id), handler)
    }

    /// Subscribe a handler to a hive's presence updates.
    pub fn subscribe_hive(&self, hive_id: HiveId, handler: UpdateHandler) -> Subscription {
        self.subscriptions
            .subscribe(&topic::hive_presence(hive_id), handler)
    }

    /// Feed a local activity signal to the auto-away detector.
    pub async fn record_activity(&self, event: ActivityEvent) {
        self.autoaway.record_activity(event).await;
    }

    /// Stop every timer, drop every subscription, and clear the store.
    ///
    /// Idempotent; safe to call from multiple shutdown paths.
    pub fn cleanup(&self) {
        info!("Cleaning up presence engine");
        self.heartbeat.stop();
        self.autoaway.disable();
        self.subscriptions.unsubscribe_all();
        self.timers.cancel_all();
        self.store.clear();
    }

    pub fn presence(&self) -> &Arc<PresenceService> {
        &self.presence
    }

    pub fn collaboration(&self) -> &Arc<CollaborationService> {
        &self.collaboration
    }

    pub fn store(&self) -> &Arc<PresenceStore> {
        &self.store
    }

    pub fn local(&self) -> &Arc<LocalPresence> {
        &self.local
    }

    pub fn heartbeat(&self) -> &Arc<HeartbeatScheduler> {
        &self.heartbeat
    }

    pub fn autoaway(&self) -> &Arc<AutoAwayDetector> {
        &self.autoaway
    }

    pub fn channel(&self) -> &Arc<dyn RealtimeChannel> {
        &self.channel
    }
}
