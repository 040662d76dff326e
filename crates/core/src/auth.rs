//! Identity, sessions and the auth provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::constants::DEFAULT_DISPLAY_NAME;

/// Authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self { id: id.into(), email }
    }

    /// Name given to a lazily created profile: the e-mail local part, or a
    /// friendly fallback.
    #[must_use]
    pub fn default_display_name(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map_or_else(|| DEFAULT_DISPLAY_NAME.to_owned(), ToOwned::to_owned)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub identity: Identity,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"***")
            .field("identity", &self.identity)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    SignedOut,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("could not get user session: {0}")]
    SessionUnavailable(String),
    #[error("sign-out failed: {0}")]
    SignOut(String),
}

/// Source of the current session and of sign-in / sign-out events.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Subscribe to future sign-in / sign-out events.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Discard the session token.
    async fn sign_out(&self) -> Result<(), AuthError>;
}
