//! HTTP implementation of the remote store contract
//!
//! Talks to a generic JSON document endpoint: the whole account snapshot
//! lives at `{base_url}/users/{user_id}/snapshot` and is replaced with PUT,
//! fetched with GET. Vendor-specific wire protocols stay behind this seam.

use super::{RemoteError, RemoteSnapshot, RemoteStore};
use crate::config::RemoteConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Credentials {
    user_id: String,
    token: String,
}

/// Remote store backed by a JSON document API
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    credentials: RwLock<Option<Credentials>>,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials: RwLock::new(None),
        }
    }

    /// Build from configuration. A pre-provisioned user id and token sign in
    /// immediately; otherwise the store starts signed out and interactive
    /// apps call `sign_in` at runtime.
    pub fn from_config(config: &RemoteConfig) -> Self {
        let store = Self::new(config.base_url.clone());
        if let (Some(user_id), Some(token)) = (&config.user_id, &config.auth_token) {
            store.sign_in(user_id.clone(), token.clone());
        }
        store
    }

    /// Record a signed-in session; subsequent pushes and pulls use it
    pub fn sign_in(&self, user_id: impl Into<String>, token: impl Into<String>) {
        let mut guard = self.credentials.write().expect("credentials lock poisoned");
        *guard = Some(Credentials {
            user_id: user_id.into(),
            token: token.into(),
        });
    }

    /// Drop the signed-in session; the engine falls back to local-only
    pub fn sign_out(&self) {
        let mut guard = self.credentials.write().expect("credentials lock poisoned");
        *guard = None;
    }

    fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .expect("credentials lock poisoned")
            .clone()
    }

    fn snapshot_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/snapshot", self.base_url, user_id)
    }

    fn map_status(status: StatusCode) -> RemoteError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized,
            StatusCode::NOT_FOUND => RemoteError::NotFound,
            other => RemoteError::Server {
                status: other.as_u16(),
            },
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn push(&self, user_id: &str, snapshot: &RemoteSnapshot) -> Result<(), RemoteError> {
        let creds = self.credentials().ok_or(RemoteError::Unauthorized)?;
        debug!(user_id, "pushing snapshot to remote");

        let response = self
            .client
            .put(self.snapshot_url(user_id))
            .bearer_auth(&creds.token)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_status(response.status()))
        }
    }

    async fn pull(&self, user_id: &str) -> Result<RemoteSnapshot, RemoteError> {
        let creds = self.credentials().ok_or(RemoteError::Unauthorized)?;
        debug!(user_id, "pulling snapshot from remote");

        let response = self
            .client
            .get(self.snapshot_url(user_id))
            .bearer_auth(&creds.token)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status()));
        }

        response
            .json::<RemoteSnapshot>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.credentials().map(|c| c.user_id)
    }
}
