//! In-process auth provider backed by the local account store.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use venti_core::{AuthError, AuthEvent, AuthProvider, AuthSession};
use venti_storage::AccountStore;

use crate::error::ServiceError;

/// Holds at most one session and broadcasts sign-in / sign-out events.
pub struct LocalAuth {
    accounts: Option<Arc<dyn AccountStore>>,
    session: RwLock<Option<AuthSession>>,
    tx: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for LocalAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAuth")
            .field("session", &*self.session.read().unwrap_or_else(PoisonError::into_inner))
            .finish_non_exhaustive()
    }
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuth {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { accounts: None, session: RwLock::new(None), tx }
    }

    /// Resolve tokens against `accounts` and revoke them on sign-out.
    #[must_use]
    pub fn with_accounts(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts: Some(accounts), ..Self::new() }
    }

    pub fn sign_in(&self, session: AuthSession) {
        tracing::info!(user_id = %session.identity.id, "signed in");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        let _ = self.tx.send(AuthEvent::SignedIn(session));
    }

    /// Look up the account owning `token` and sign in as it.
    pub async fn sign_in_with_token(&self, token: &str) -> Result<AuthSession, ServiceError> {
        let Some(accounts) = &self.accounts else {
            return Err(ServiceError::Auth(AuthError::SessionUnavailable(
                "no account store configured".to_owned(),
            )));
        };
        let account = accounts
            .resolve_token(token)
            .await
            .map_err(|e| AuthError::SessionUnavailable(e.to_string()))?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid access token".to_owned()))?;
        let session = AuthSession { access_token: token.to_owned(), identity: account.identity() };
        self.sign_in(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.session.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.session.write().unwrap_or_else(PoisonError::into_inner).take();
        if let (Some(accounts), Some(session)) = (&self.accounts, &previous) {
            accounts
                .revoke_token(&session.access_token)
                .await
                .map_err(|e| AuthError::SignOut(e.to_string()))?;
        }
        let _ = self.tx.send(AuthEvent::SignedOut);
        Ok(())
    }
}
