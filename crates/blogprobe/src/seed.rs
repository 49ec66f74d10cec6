//! Backend state reset and user seeding.
//!
//! Setup talks to the backend's testing API directly, never through the UI.
//! Failures here are fatal to the scenario and never retried.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Endpoint that wipes all users and blogs
pub const RESET_PATH: &str = "/api/testing/reset";

/// Endpoint that creates a user
pub const USERS_PATH: &str = "/api/users";

/// User creation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Login name, unique
    pub username: String,
    /// Display name shown as `"<name> logged in"`
    pub name: String,
    /// Plain-text password
    pub password: String,
}

impl NewUser {
    /// Create a user payload
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            password: password.into(),
        }
    }
}

/// HTTP client for the testing API
#[derive(Debug, Clone)]
pub struct SeedClient {
    client: reqwest::Client,
    base_url: String,
}

impl SeedClient {
    /// Create a client for the backend at `base_url`
    ///
    /// # Errors
    ///
    /// Returns `Setup` if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> ProbeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProbeError::setup("client", e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Backend base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Wipe all users and blogs. Safe to repeat.
    pub async fn reset(&self) -> ProbeResult<()> {
        debug!(backend = %self.base_url, "resetting backend state");
        let response = self
            .client
            .post(self.url(RESET_PATH))
            .send()
            .await
            .map_err(|e| ProbeError::setup(RESET_PATH, e.to_string()))?;
        check_status(RESET_PATH, response).await
    }

    /// Create one user
    pub async fn create_user(&self, user: &NewUser) -> ProbeResult<()> {
        debug!(username = %user.username, "seeding user");
        let response = self
            .client
            .post(self.url(USERS_PATH))
            .json(user)
            .send()
            .await
            .map_err(|e| ProbeError::setup(USERS_PATH, e.to_string()))?;
        check_status(USERS_PATH, response).await
    }

    /// Reset, then create every user in order
    pub async fn apply(&self, users: &[NewUser]) -> ProbeResult<()> {
        self.reset().await?;
        for user in users {
            self.create_user(user).await?;
        }
        info!(users = users.len(), "backend reset and seeded");
        Ok(())
    }
}

async fn check_status(endpoint: &str, response: reqwest::Response) -> ProbeResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProbeError::setup(
        endpoint,
        format!("status {status}: {}", body.trim()),
    ))
}
