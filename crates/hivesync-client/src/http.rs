//! HTTP implementation of the presence API over reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use hivesync_core::config::api::ApiConfig;
use hivesync_core::error::AppError;
use hivesync_core::result::AppResult;
use hivesync_core::types::{CollabSessionId, HiveId, UserId};
use hivesync_entity::collaboration::{CollaborationSession, SharedActivitySpec};
use hivesync_entity::presence::{HivePresence, SetPresenceRequest, UserPresence};
use hivesync_entity::reporting::{PresenceHistoryEntry, PresenceStatistics};

use crate::api::PresenceApi;
use crate::token::TokenProvider;

/// Presence API client over HTTP with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpPresenceApi {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

/// Wire shape of `POST /presence/bulk` responses.
#[derive(Debug, Deserialize)]
struct BulkPresenceResponse {
    presences: Vec<UserPresence>,
}

/// Wire shape of `POST /presence/collaboration` requests.
#[derive(Debug, serde::Serialize)]
struct CreateCollaborationRequest<'a> {
    hive_id: HiveId,
    activity: &'a SharedActivitySpec,
}

impl HttpPresenceApi {
    /// Build a client from configuration and a token provider.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenProvider>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    hivesync_core::error::ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer credential, failing fast when none is available.
    fn authorize(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::RequestBuilder> {
        match self.tokens.bearer_token() {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(AppError::authentication(
                "No credential available for presence API call",
            )),
        }
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> AppResult<T> {
        let response = self.authorize(request)?.send().await.map_err(|e| {
            AppError::with_source(
                hivesync_core::error::ErrorKind::ExternalService,
                format!("{context}: transport error: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, context, "Presence API call failed");
            return Err(match status.as_u16() {
                401 | 403 => {
                    AppError::authentication(format!("{context}: credential rejected ({status})"))
                }
                404 => AppError::not_found(format!("{context}: not found")),
                _ => AppError::external_service(format!("{context}: server returned {status}")),
            });
        }

        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                hivesync_core::error::ErrorKind::Serialization,
                format!("{context}: invalid response body: {e}"),
                e,
            )
        })
    }

    /// Send a request and discard the body.
    async fn execute_empty(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> AppResult<()> {
        let response = self.authorize(request)?.send().await.map_err(|e| {
            AppError::with_source(
                hivesync_core::error::ErrorKind::ExternalService,
                format!("{context}: transport error: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                AppError::external_service(format!("{context}: server returned {status}")),
            );
        }
        Ok(())
    }
}

#[async_trait]
impl PresenceApi for HttpPresenceApi {
    async fn set_presence(&self, request: &SetPresenceRequest) -> AppResult<UserPresence> {
        let req = self.http.put(self.url("/presence")).json(request);
        self.execute(req, "set presence").await
    }

    async fn get_user_presence(&self, user_id: UserId) -> AppResult<UserPresence> {
        let req = self.http.get(self.url(&format!("/presence/users/{user_id}")));
        self.execute(req, "get user presence").await
    }

    async fn get_hive_presence(&self, hive_id: HiveId) -> AppResult<HivePresence> {
        let req = self.http.get(self.url(&format!("/presence/hives/{hive_id}")));
        self.execute(req, "get hive presence").await
    }

    async fn get_bulk_presence(&self, user_ids: &[UserId]) -> AppResult<Vec<UserPresence>> {
        let req = self
            .http
            .post(self.url("/presence/bulk"))
            .json(&serde_json::json!({ "user_ids": user_ids }));
        let body: BulkPresenceResponse = self.execute(req, "get bulk presence").await?;
        Ok(body.presences)
    }

    async fn get_statistics(&self, user_id: UserId) -> AppResult<PresenceStatistics> {
        let req = self
            .http
            .get(self.url(&format!("/presence/users/{user_id}/statistics")));
        self.execute(req, "get presence statistics").await
    }

    async fn get_history(&self, user_id: UserId) -> AppResult<Vec<PresenceHistoryEntry>> {
        let req = self
            .http
            .get(self.url(&format!("/presence/users/{user_id}/history")));
        self.execute(req, "get presence history").await
    }

    async fn create_collaboration(
        &self,
        hive_id: HiveId,
        activity: &SharedActivitySpec,
    ) -> AppResult<CollaborationSession> {
        let req = self
            .http
            .post(self.url("/presence/collaboration"))
            .json(&CreateCollaborationRequest { hive_id, activity });
        self.execute(req, "create collaboration session").await
    }

    async fn join_collaboration(
        &self,
        session_id: CollabSessionId,
    ) -> AppResult<CollaborationSession> {
        let req = self
            .http
            .post(self.url(&format!("/presence/collaboration/{session_id}/join")));
        self.execute(req, "join collaboration session").await
    }

    async fn leave_collaboration(&self, session_id: CollabSessionId) -> AppResult<()> {
        let req = self
            .http
            .post(self.url(&format!("/presence/collaboration/{session_id}/leave")));
        self.execute_empty(req, "leave collaboration session").await
    }
}
