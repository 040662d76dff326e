//! Session lifecycle: auth events, bootstrap, retry, sign-out and reset.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use venti_core::{AuthError, AuthEvent, AuthProvider, Clock, Companion, Identity, RecordId};
use venti_storage::{ProfileStore, RecordStore};

use crate::bootstrap::SessionBootstrapper;
use crate::config::ServiceConfig;
use crate::deadline::within;
use crate::error::{ServiceError, SessionFailure};
use crate::mutation::Mutations;
use crate::notice::NoticeBoard;
use crate::state::{AppView, Screen, SessionPhase, StateContainer};

/// Owns the state container and everything allowed to write to it.
pub struct AppSession {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RecordStore>,
    state: Arc<StateContainer>,
    notices: Arc<NoticeBoard>,
    bootstrapper: SessionBootstrapper,
    mutations: Mutations,
    timeout: Duration,
}

impl AppSession {
    #[must_use]
    pub fn new(
        config: &ServiceConfig,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn RecordStore>,
        companion: Arc<dyn Companion>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = Arc::new(StateContainer::new());
        let notices = Arc::new(NoticeBoard::new(config.notice_ttl));
        let bootstrapper = SessionBootstrapper::new(store.clone(), config.request_timeout);
        let mutations = Mutations::new(
            state.clone(),
            store.clone(),
            companion,
            notices.clone(),
            clock,
            config.request_timeout,
        );
        Self {
            auth,
            store,
            state,
            notices,
            bootstrapper,
            mutations,
            timeout: config.request_timeout,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &Arc<StateContainer> {
        &self.state
    }

    #[must_use]
    pub const fn notices(&self) -> &Arc<NoticeBoard> {
        &self.notices
    }

    #[must_use]
    pub const fn mutations(&self) -> &Mutations {
        &self.mutations
    }

    #[must_use]
    pub fn snapshot(&self) -> AppView {
        self.state.snapshot()
    }

    /// Pick up an existing session at start-up.
    pub async fn initialize(&self) -> SessionPhase {
        match within(self.timeout, "session fetch", self.auth.current_session()).await {
            Ok(Some(session)) => self.bootstrap(&session.identity).await,
            Ok(None) => {
                self.state.clear();
                SessionPhase::SignedOut
            },
            Err(e) => {
                let failure = session_unavailable(&e);
                tracing::error!(error = %failure, "session fetch failed");
                self.state.clear();
                self.state.fail(self.state.epoch(), failure);
                self.state.snapshot().phase
            },
        }
    }

    /// Load the aggregate for `identity`, replacing whatever was loaded.
    pub async fn bootstrap(&self, identity: &Identity) -> SessionPhase {
        let epoch = self.state.begin_loading(identity.clone());
        match self.bootstrapper.establish_session(identity).await {
            Ok(data) => {
                self.state.install(epoch, data);
            },
            Err(failure) => {
                // The token stays valid; the user can retry or sign out.
                self.state.fail(epoch, failure);
            },
        }
        self.state.snapshot().phase
    }

    /// Re-run the bootstrap after a fatal failure.
    pub async fn retry(&self) -> SessionPhase {
        match self.state.snapshot().identity {
            Some(identity) => self.bootstrap(&identity).await,
            None => self.initialize().await,
        }
    }

    /// Drop all local state immediately, then discard the token.
    pub async fn sign_out(&self) -> Result<(), ServiceError> {
        self.state.clear();
        self.notices.clear();
        within(self.timeout, "sign out", self.auth.sign_out()).await
    }

    pub async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => {
                let view = self.state.snapshot();
                let loaded_for_same_user = view.identity.as_ref() == Some(&session.identity)
                    && matches!(view.phase, SessionPhase::Ready | SessionPhase::Loading);
                if loaded_for_same_user {
                    tracing::debug!(user_id = %session.identity.id, "already loaded, ignoring sign-in");
                    return;
                }
                self.bootstrap(&session.identity).await;
            },
            AuthEvent::SignedOut => {
                self.state.clear();
                self.notices.clear();
            },
        }
    }

    /// Feed auth events into `handle_event` until the provider goes away.
    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.auth.subscribe();
        let session = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => session.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth listener lagged");
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Delete the profile and everything it owns, then clear local state.
    pub async fn reset_account(&self) -> Result<bool, ServiceError> {
        let (_, user_id) = self.state.active()?;
        match within(self.timeout, "account reset", self.store.delete_profile(&user_id)).await {
            Ok(existed) => {
                tracing::info!(user_id, existed, "account reset");
                self.state.clear();
                self.notices.success("Your data has been reset.");
                Ok(existed)
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "account reset failed");
                self.notices.error("Could not reset your account. Please try again.");
                Err(e)
            },
        }
    }

    pub fn navigate(&self, screen: Screen) {
        self.state.update_view(|view| view.navigation.push(screen));
    }

    /// Pop the active screen; the root screen stays.
    pub fn back(&self) {
        self.state.update_view(|view| {
            if view.navigation.len() > 1 {
                view.navigation.pop();
            }
        });
    }

    pub fn reset_to(&self, screen: Screen) {
        self.state.update_view(|view| view.navigation = vec![screen]);
    }

    pub fn open_story(&self, id: Option<RecordId>) {
        self.state.update_view(|view| {
            view.active_story = id;
            view.navigation.push(Screen::StoryEditor);
        });
    }

    pub fn show_sos(&self) {
        self.state.update_view(|view| view.sos_visible = true);
    }

    pub fn dismiss_sos(&self) {
        self.state.update_view(|view| view.sos_visible = false);
    }
}

fn session_unavailable(e: &ServiceError) -> SessionFailure {
    let detail = match e {
        ServiceError::Auth(AuthError::SessionUnavailable(message)) => message.clone(),
        other => other.to_string(),
    };
    SessionFailure::SessionUnavailable { message: format!("Could not get user session: {detail}") }
}
