//! Shared test helpers for integration tests.

// Each test binary compiles its own copy; not all of them use every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use hivesync_client::PresenceApi;
use hivesync_core::config::PresenceConfig;
use hivesync_core::error::AppError;
use hivesync_core::result::AppResult;
use hivesync_core::types::{CollabSessionId, HiveId, UserId};
use hivesync_entity::collaboration::{
    CollaborationSession, SessionPhase, SharedActivity, SharedActivitySpec,
};
use hivesync_entity::presence::{
    ActivityKind, DeviceKind, HivePresence, PresenceStatus, SetPresenceRequest, UserPresence,
};
use hivesync_entity::reporting::{PresenceHistoryEntry, PresenceStatistics};
use hivesync_realtime::InProcessChannel;
use hivesync_realtime::channel::RealtimeChannel;
use hivesync_service::PresenceEngine;

/// Programmable in-memory presence backend.
#[derive(Debug)]
pub struct MockPresenceApi {
    /// Users known to the backend, served by the read endpoints.
    pub users: DashMap<UserId, UserPresence>,
    /// Hive views served by `get_hive_presence`.
    pub hives: DashMap<HiveId, HivePresence>,
    /// When set, every mutation fails with a remote error.
    pub fail_mutations: AtomicBool,
    /// Artificial latency applied to mutations.
    pub mutation_delay: Mutex<Duration>,
    /// Every `set_presence` request received.
    pub set_requests: Mutex<Vec<SetPresenceRequest>>,
    /// Session IDs the backend saw a leave for.
    pub left_sessions: Mutex<Vec<CollabSessionId>>,
}

impl MockPresenceApi {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            hives: DashMap::new(),
            fail_mutations: AtomicBool::new(false),
            mutation_delay: Mutex::new(Duration::ZERO),
            set_requests: Mutex::new(Vec::new()),
            left_sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub async fn set_mutation_delay(&self, delay: Duration) {
        *self.mutation_delay.lock().await = delay;
    }

    /// The timestamp stamped on the most recent confirmed mutation.
    pub fn confirmed_last_seen(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        self.users.get(&user_id).map(|p| p.last_seen)
    }
}

#[async_trait]
impl PresenceApi for MockPresenceApi {
    async fn set_presence(&self, request: &SetPresenceRequest) -> AppResult<UserPresence> {
        self.set_requests.lock().await.push(request.clone());
        let delay = *self.mutation_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::external_service("presence backend unavailable"));
        }
        // The mock serves a single calling user; its identity is whatever
        // was seeded, defaulting to a fresh one on first mutation.
        let user_id = self
            .users
            .iter()
            .next()
            .map(|e| *e.key())
            .unwrap_or_else(UserId::new);
        let confirmed = UserPresence {
            user_id,
            status: request.status,
            activity: request.activity.clone(),
            last_seen: Utc::now(),
            device: request.device,
            current_hive_id: request.hive_id,
        };
        self.users.insert(user_id, confirmed.clone());
        Ok(confirmed)
    }

    async fn get_user_presence(&self, user_id: UserId) -> AppResult<UserPresence> {
        self.users
            .get(&user_id)
            .map(|p| p.clone())
            .ok_or_else(|| AppError::not_found("Unknown user"))
    }

    async fn get_hive_presence(&self, hive_id: HiveId) -> AppResult<HivePresence> {
        self.hives
            .get(&hive_id)
            .map(|p| p.clone())
            .ok_or_else(|| AppError::not_found("Unknown hive"))
    }

    async fn get_bulk_presence(&self, user_ids: &[UserId]) -> AppResult<Vec<UserPresence>> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn get_statistics(&self, user_id: UserId) -> AppResult<PresenceStatistics> {
        Ok(PresenceStatistics {
            user_id,
            online_seconds: 0,
            focusing_seconds: 0,
            focus_sessions: 0,
            window_start: Utc::now(),
            window_end: Utc::now(),
        })
    }

    async fn get_history(&self, _user_id: UserId) -> AppResult<Vec<PresenceHistoryEntry>> {
        Ok(Vec::new())
    }

    async fn create_collaboration(
        &self,
        hive_id: HiveId,
        activity: &SharedActivitySpec,
    ) -> AppResult<CollaborationSession> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::external_service("presence backend unavailable"));
        }
        Ok(session(CollabSessionId::new(), hive_id, activity.clone()))
    }

    async fn join_collaboration(
        &self,
        session_id: CollabSessionId,
    ) -> AppResult<CollaborationSession> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::external_service("presence backend unavailable"));
        }
        Ok(session(
            session_id,
            HiveId::new(),
            SharedActivitySpec {
                kind: ActivityKind::Focus,
                duration_minutes: 25,
            },
        ))
    }

    async fn leave_collaboration(&self, session_id: CollabSessionId) -> AppResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::external_service("presence backend unavailable"));
        }
        self.left_sessions.lock().await.push(session_id);
        Ok(())
    }
}

fn session(
    session_id: CollabSessionId,
    hive_id: HiveId,
    activity: SharedActivitySpec,
) -> CollaborationSession {
    CollaborationSession {
        session_id,
        hive_id,
        participants: vec![UserId::new()],
        shared_activity: SharedActivity {
            kind: activity.kind,
            phase: SessionPhase::Active,
            duration_minutes: activity.duration_minutes,
        },
        created_by: UserId::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A fully wired engine over the mock backend and an in-process channel.
pub struct TestEngine {
    pub engine: Arc<PresenceEngine>,
    pub api: Arc<MockPresenceApi>,
    pub channel: Arc<InProcessChannel>,
    pub user_id: UserId,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: PresenceConfig) -> Self {
        let user_id = UserId::new();
        let api = Arc::new(MockPresenceApi::new());
        api.users.insert(
            user_id,
            UserPresence {
                user_id,
                status: PresenceStatus::Online,
                activity: None,
                last_seen: Utc::now(),
                device: DeviceKind::Desktop,
                current_hive_id: None,
            },
        );
        let channel = Arc::new(InProcessChannel::new(config_buffer(&config)));
        let engine = Arc::new(PresenceEngine::new(
            config,
            user_id,
            DeviceKind::Desktop,
            api.clone() as Arc<dyn PresenceApi>,
            channel.clone() as Arc<dyn RealtimeChannel>,
        ));
        Self {
            engine,
            api,
            channel,
            user_id,
        }
    }
}

/// Fast timings so scenarios finish in tens of milliseconds.
pub fn test_config() -> PresenceConfig {
    PresenceConfig {
        cache_ttl_seconds: 60,
        heartbeat_interval_seconds: 1,
        heartbeat_timeout_seconds: 60,
        auto_away_threshold_ms: 50,
    }
}

fn config_buffer(_config: &PresenceConfig) -> usize {
    64
}
