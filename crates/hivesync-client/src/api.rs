//! Remote presence API trait.

use async_trait::async_trait;

use hivesync_core::result::AppResult;
use hivesync_core::types::{CollabSessionId, HiveId, UserId};
use hivesync_entity::collaboration::{CollaborationSession, SharedActivitySpec};
use hivesync_entity::presence::{HivePresence, SetPresenceRequest, UserPresence};
use hivesync_entity::reporting::{PresenceHistoryEntry, PresenceStatistics};

/// The remote presence API consumed by the engine.
///
/// Mutations return the server-confirmed value; the optimistic coordinator
/// replaces its provisional cache entry with it. Implementations must not
/// retry internally — retry policy belongs to the caller.
#[async_trait]
pub trait PresenceApi: Send + Sync + std::fmt::Debug + 'static {
    /// `PUT /presence` — change the calling user's own status.
    async fn set_presence(&self, request: &SetPresenceRequest) -> AppResult<UserPresence>;

    /// `GET /presence/users/{id}`.
    async fn get_user_presence(&self, user_id: UserId) -> AppResult<UserPresence>;

    /// `GET /presence/hives/{id}`.
    async fn get_hive_presence(&self, hive_id: HiveId) -> AppResult<HivePresence>;

    /// `POST /presence/bulk`.
    ///
    /// The request body is `{"user_ids": [...]}` — the wire contract is
    /// snake_case throughout, this body included.
    async fn get_bulk_presence(&self, user_ids: &[UserId]) -> AppResult<Vec<UserPresence>>;

    /// `GET /presence/users/{id}/statistics` (read-only reporting).
    async fn get_statistics(&self, user_id: UserId) -> AppResult<PresenceStatistics>;

    /// `GET /presence/users/{id}/history` (read-only reporting).
    async fn get_history(&self, user_id: UserId) -> AppResult<Vec<PresenceHistoryEntry>>;

    /// `POST /presence/collaboration`.
    async fn create_collaboration(
        &self,
        hive_id: HiveId,
        activity: &SharedActivitySpec,
    ) -> AppResult<CollaborationSession>;

    /// `POST /presence/collaboration/{id}/join`.
    async fn join_collaboration(
        &self,
        session_id: CollabSessionId,
    ) -> AppResult<CollaborationSession>;

    /// `POST /presence/collaboration/{id}/leave`.
    async fn leave_collaboration(&self, session_id: CollabSessionId) -> AppResult<()>;
}
