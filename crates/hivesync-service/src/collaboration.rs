//! Ephemeral collaboration session management.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use hivesync_client::PresenceApi;
use hivesync_core::result::AppResult;
use hivesync_core::types::{CollabSessionId, HiveId};
use hivesync_entity::collaboration::{CollaborationSession, SharedActivitySpec};

/// Manages this client's participation in shared-activity sessions.
///
/// Membership is server-owned, so create and join carry no optimistic
/// state. Leave is the deliberate exception: the local reference is cleared
/// before the remote call is even issued, because a user must always be
/// able to appear to leave regardless of network health.
#[derive(Debug)]
pub struct CollaborationService {
    api: Arc<dyn PresenceApi>,
    current: RwLock<Option<CollaborationSession>>,
}

impl CollaborationService {
    pub fn new(api: Arc<dyn PresenceApi>) -> Self {
        Self {
            api,
            current: RwLock::new(None),
        }
    }

    /// Create a session in a hive and make it the current one.
    pub async fn create(
        &self,
        hive_id: HiveId,
        activity: SharedActivitySpec,
    ) -> AppResult<CollaborationSession> {
        let session = self.api.create_collaboration(hive_id, &activity).await?;
        debug!(session_id = %session.session_id, hive_id = %hive_id, "Created collaboration session");
        *self.current.write().await = Some(session.clone());
        Ok(session)
    }

    /// Join an existing session and make it the current one.
    pub async fn join(&self, session_id: CollabSessionId) -> AppResult<CollaborationSession> {
        let session = self.api.join_collaboration(session_id).await?;
        debug!(session_id = %session_id, "Joined collaboration session");
        *self.current.write().await = Some(session.clone());
        Ok(session)
    }

    /// Leave a session.
    ///
    /// The local reference is cleared immediately and the remote leave runs
    /// in the background; its failure is logged, never surfaced.
    pub async fn leave(&self, session_id: CollabSessionId) {
        {
            let mut current = self.current.write().await;
            if current
                .as_ref()
                .is_some_and(|s| s.session_id == session_id)
            {
                *current = None;
            }
        }
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.leave_collaboration(session_id).await {
                warn!(session_id = %session_id, "Remote session leave failed: {e}");
            }
        });
    }

    /// The session this client currently considers itself part of.
    pub async fn current_session(&self) -> Option<CollaborationSession> {
        self.current.read().await.clone()
    }

    /// Drop the local session reference without a remote call.
    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use hivesync_core::error::AppError;
    use hivesync_core::types::UserId;
    use hivesync_entity::collaboration::{SessionPhase, SharedActivity};
    use hivesync_entity::presence::{ActivityKind, HivePresence, UserPresence};
    use hivesync_entity::presence::SetPresenceRequest;
    use hivesync_entity::reporting::{PresenceHistoryEntry, PresenceStatistics};

    #[derive(Debug, Default)]
    struct MockApi {
        fail_leave: AtomicBool,
        left: AtomicBool,
    }

    fn session(session_id: CollabSessionId, hive_id: HiveId) -> CollaborationSession {
        CollaborationSession {
            session_id,
            hive_id,
            participants: vec![UserId::new()],
            shared_activity: SharedActivity {
                kind: ActivityKind::Focus,
                phase: SessionPhase::Active,
                duration_minutes: 25,
            },
            created_by: UserId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl PresenceApi for MockApi {
        async fn set_presence(&self, _request: &SetPresenceRequest) -> AppResult<UserPresence> {
            Err(AppError::internal("not exercised"))
        }

        async fn get_user_presence(&self, _user_id: UserId) -> AppResult<UserPresence> {
            Err(AppError::internal("not exercised"))
        }

        async fn get_hive_presence(&self, _hive_id: HiveId) -> AppResult<HivePresence> {
            Err(AppError::internal("not exercised"))
        }

        async fn get_bulk_presence(&self, _user_ids: &[UserId]) -> AppResult<Vec<UserPresence>> {
            Err(AppError::internal("not exercised"))
        }

        async fn get_statistics(&self, _user_id: UserId) -> AppResult<PresenceStatistics> {
            Err(AppError::internal("not exercised"))
        }

        async fn get_history(&self, _user_id: UserId) -> AppResult<Vec<PresenceHistoryEntry>> {
            Err(AppError::internal("not exercised"))
        }

        async fn create_collaboration(
            &self,
            hive_id: HiveId,
            _activity: &SharedActivitySpec,
        ) -> AppResult<CollaborationSession> {
            Ok(session(CollabSessionId::new(), hive_id))
        }

        async fn join_collaboration(
            &self,
            session_id: CollabSessionId,
        ) -> AppResult<CollaborationSession> {
            Ok(session(session_id, HiveId::new()))
        }

        async fn leave_collaboration(&self, _session_id: CollabSessionId) -> AppResult<()> {
            if self.fail_leave.load(Ordering::SeqCst) {
                return Err(AppError::external_service("leave rejected"));
            }
            self.left.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_sets_current_session() {
        let service = CollaborationService::new(Arc::new(MockApi::default()));
        let hive_id = HiveId::new();
        let created = service
            .create(
                hive_id,
                SharedActivitySpec {
                    kind: ActivityKind::Focus,
                    duration_minutes: 25,
                },
            )
            .await
            .expect("create");
        assert_eq!(created.hive_id, hive_id);
        assert_eq!(service.current_session().await, Some(created));
    }

    #[tokio::test]
    async fn test_leave_clears_local_reference_before_remote_outcome() {
        let api = Arc::new(MockApi::default());
        api.fail_leave.store(true, Ordering::SeqCst);
        let service = CollaborationService::new(api);

        let joined = service.join(CollabSessionId::new()).await.expect("join");
        service.leave(joined.session_id).await;

        // Local reference gone even though the remote leave will fail.
        assert!(service.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_leave_issues_remote_call_in_background() {
        let api = Arc::new(MockApi::default());
        let service = CollaborationService::new(api.clone());

        let joined = service.join(CollabSessionId::new()).await.expect("join");
        service.leave(joined.session_id).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(api.left.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_leaving_a_different_session_keeps_current() {
        let service = CollaborationService::new(Arc::new(MockApi::default()));
        let joined = service.join(CollabSessionId::new()).await.expect("join");

        service.leave(CollabSessionId::new()).await;
        assert_eq!(service.current_session().await, Some(joined));
    }
}
