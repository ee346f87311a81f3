//! Session acquisition
//!
//! Loads a previously authorized token from disk, refreshes it against the
//! OAuth token endpoint when expired, and persists the refreshed token back.
//! There is no interactive consent flow here: a missing or unrefreshable
//! token surfaces as `AuthExpired` and the user re-authorizes out of band.

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dsync_core::{Error, Result};

/// Default OAuth token endpoint
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Safety margin before the recorded expiry at which a token is treated as
/// expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// An authorized-user token as persisted on disk
///
/// Field names follow the stored-credential JSON layout, so a token file
/// written by other tooling for the same account loads unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// Current access token
    pub token: String,

    /// Long-lived refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token endpoint to refresh against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    /// OAuth client id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Access token expiry (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Timestamp>,
}

impl StoredToken {
    /// Whether the access token is expired (or close enough to expiry that
    /// it should not be used for a new transfer)
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expiry {
            Some(expiry) => expiry.as_second() - now.as_second() <= EXPIRY_SKEW_SECS,
            // No recorded expiry: assume still valid, the API will reject
            // it with 401 if not
            None => false,
        }
    }
}

/// Reads and writes the token file
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token, failing with `AuthExpired` if absent
    pub fn load(&self) -> Result<StoredToken> {
        if !self.path.exists() {
            return Err(Error::AuthExpired(format!(
                "No stored token at {}. Authorize this client first.",
                self.path.display()
            )));
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the token with owner-only permissions
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        Ok(())
    }
}

/// A validated remote-store session
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    /// Build a session from a raw access token (useful for tests)
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
        }
    }

    /// The bearer token for request authorization
    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

/// Refresh response from the token endpoint
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Acquire a validated session from the token file, refreshing if expired.
///
/// A refreshed token is written back to the store before the session is
/// returned.
pub async fn acquire_session(store: &TokenStore) -> Result<Session> {
    let mut token = store.load()?;
    let now = Timestamp::now();

    if !token.is_expired(now) {
        debug!(path = %store.path().display(), "using stored access token");
        return Ok(Session::from_access_token(token.token));
    }

    let refresh_token = token.refresh_token.clone().ok_or_else(|| {
        Error::AuthExpired("Stored token is expired and has no refresh token".into())
    })?;
    let (client_id, client_secret) = match (&token.client_id, &token.client_secret) {
        (Some(id), Some(secret)) => (id.clone(), secret.clone()),
        _ => {
            return Err(Error::AuthExpired(
                "Stored token is missing the client id/secret needed to refresh".into(),
            ))
        }
    };
    let endpoint = token
        .token_uri
        .clone()
        .unwrap_or_else(|| TOKEN_ENDPOINT.to_string());

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token.as_str()),
        ("client_id", client_id.as_str()),
        ("client_secret", client_secret.as_str()),
    ];

    let response = reqwest::Client::new()
        .post(&endpoint)
        .form(&params)
        .send()
        .await
        .map_err(|e| Error::Transfer(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::AuthExpired(format!(
            "Token refresh failed with {status}: {}",
            crate::client::truncate_detail(&body)
        )));
    }

    let refreshed: RefreshResponse = response
        .json()
        .await
        .map_err(|e| Error::Transfer(e.to_string()))?;

    token.token = refreshed.access_token.clone();
    token.expiry = refreshed
        .expires_in
        .map(|secs| Timestamp::from_second(now.as_second() + secs).unwrap_or(now));
    store.save(&token)?;
    info!("refreshed access token");

    Ok(Session::from_access_token(refreshed.access_token))
}
