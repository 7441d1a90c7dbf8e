//! Session collaborator: tears down the call resource once hang-up is granted.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigError, SessionError};

/// Ends the call identified by `session_id`. Returns whether teardown succeeded.
#[async_trait]
pub trait CallSession: Send + Sync {
    async fn teardown(&self, session_id: &str) -> bool;
}

/// Room service configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct RoomServiceConfig {
    /// Base URL of the media server, e.g. `https://media.example.com`.
    pub url: String,
    pub token: SecretString,
}

impl RoomServiceConfig {
    /// Returns `Ok(None)` if `ROOM_SERVICE_URL` is not set. A URL without a
    /// `ROOM_SERVICE_TOKEN` is a configuration error.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_values(
            std::env::var("ROOM_SERVICE_URL").ok(),
            std::env::var("ROOM_SERVICE_TOKEN").ok(),
        )
    }

    fn from_values(url: Option<String>, token: Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(url) = url.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let token = token
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("ROOM_SERVICE_TOKEN".to_string()))?;
        Ok(Some(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            token: SecretString::from(token),
        }))
    }
}

/// Deletes the call's room through the media server's room-service API.
pub struct RoomServiceSession {
    config: RoomServiceConfig,
    client: reqwest::Client,
}

impl RoomServiceSession {
    pub fn new(config: RoomServiceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn delete_room_url(&self) -> String {
        format!("{}/twirp/livekit.RoomService/DeleteRoom", self.config.url)
    }

    async fn delete_room(&self, session_id: &str) -> Result<(), SessionError> {
        let resp = self
            .client
            .post(self.delete_room_url())
            .bearer_auth(self.config.token.expose_secret())
            .json(&serde_json::json!({ "room": session_id }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::TeardownFailed {
                session_id: session_id.to_string(),
                reason: format!("{status}: {body}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CallSession for RoomServiceSession {
    async fn teardown(&self, session_id: &str) -> bool {
        match self.delete_room(session_id).await {
            Ok(()) => {
                tracing::info!(session_id, "Call room deleted");
                true
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Call teardown failed");
                false
            }
        }
    }
}

/// Session used when no room service is configured: nothing to tear down.
pub struct LocalSession;

#[async_trait]
impl CallSession for LocalSession {
    async fn teardown(&self, session_id: &str) -> bool {
        tracing::info!(session_id, "Local session ended");
        true
    }
}
