//! Aggregate state container.
//!
//! One `watch` channel holds the whole [`AppView`]; every write goes through
//! `send_if_modified` so subscribers observe each update as a single step.
//! Writes to the aggregate carry the epoch they were started under and are
//! dropped once the session has moved on (sign-out, re-bootstrap).

use serde::Serialize;
use tokio::sync::watch;
use venti_core::{Identity, RecordId, UserData};

use crate::error::{ServiceError, SessionFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Home,
    Journal,
    Chat,
    Programs,
    More,
    CommunityGroup,
    CommunityStories,
    MyStories,
    StoryEditor,
    Learn,
    AdminDashboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum SessionPhase {
    SignedOut,
    Loading,
    Ready,
    Failed { failure: SessionFailure },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppView {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub user_data: Option<UserData>,
    /// Never empty; the last element is the active screen.
    pub navigation: Vec<Screen>,
    pub sos_visible: bool,
    /// Number of times crisis resources were surfaced this session.
    pub sos_activations: u64,
    pub active_story: Option<RecordId>,
    pub epoch: u64,
}

impl Default for AppView {
    fn default() -> Self {
        Self {
            phase: SessionPhase::SignedOut,
            identity: None,
            user_data: None,
            navigation: vec![Screen::Home],
            sos_visible: false,
            sos_activations: 0,
            active_story: None,
            epoch: 0,
        }
    }
}

impl AppView {
    #[must_use]
    pub fn active_screen(&self) -> Screen {
        self.navigation.last().copied().unwrap_or(Screen::Home)
    }
}

#[derive(Debug)]
pub struct StateContainer {
    tx: watch::Sender<AppView>,
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateContainer {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AppView::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppView> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> AppView {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    #[must_use]
    pub fn user_data(&self) -> Option<UserData> {
        self.tx.borrow().user_data.clone()
    }

    /// Epoch and user id of the loaded aggregate.
    pub fn active(&self) -> Result<(u64, String), ServiceError> {
        let view = self.tx.borrow();
        match (&view.phase, &view.user_data) {
            (SessionPhase::Ready, Some(data)) => Ok((view.epoch, data.user_id().to_owned())),
            _ => Err(ServiceError::NoSession),
        }
    }

    /// Start a new bootstrap for `identity`, invalidating every in-flight write.
    pub fn begin_loading(&self, identity: Identity) -> u64 {
        let mut epoch = 0;
        self.tx.send_modify(|view| {
            view.epoch += 1;
            view.phase = SessionPhase::Loading;
            view.identity = Some(identity);
            view.user_data = None;
            epoch = view.epoch;
        });
        epoch
    }

    /// Install a freshly assembled aggregate. Returns `false` if `epoch` is stale.
    pub fn install(&self, epoch: u64, data: UserData) -> bool {
        self.tx.send_if_modified(|view| {
            if view.epoch != epoch {
                return false;
            }
            view.user_data = Some(data);
            view.phase = SessionPhase::Ready;
            true
        })
    }

    pub fn fail(&self, epoch: u64, failure: SessionFailure) -> bool {
        self.tx.send_if_modified(|view| {
            if view.epoch != epoch {
                return false;
            }
            view.user_data = None;
            view.phase = SessionPhase::Failed { failure };
            true
        })
    }

    /// Drop everything: aggregate, navigation, overlays and pending writes.
    pub fn clear(&self) {
        self.tx.send_modify(|view| {
            let epoch = view.epoch + 1;
            *view = AppView { epoch, ..AppView::default() };
        });
    }

    /// Apply `f` to the aggregate if it is still the one loaded at `epoch`.
    pub fn update_data<R>(&self, epoch: u64, f: impl FnOnce(&mut UserData) -> R) -> Option<R> {
        let mut out = None;
        self.tx.send_if_modified(|view| {
            if view.epoch != epoch {
                return false;
            }
            match view.user_data.as_mut() {
                Some(data) => {
                    out = Some(f(data));
                    true
                },
                None => false,
            }
        });
        out
    }

    /// Navigation and overlay changes; the aggregate itself goes through `update_data`.
    pub fn update_view(&self, f: impl FnOnce(&mut AppView)) {
        self.tx.send_modify(f);
    }

    /// Surface crisis resources, unless the session at `epoch` is gone.
    pub fn trigger_sos(&self, epoch: u64) -> bool {
        self.tx.send_if_modified(|view| {
            if view.epoch != epoch {
                return false;
            }
            view.sos_visible = true;
            view.sos_activations += 1;
            true
        })
    }
}
