//! Optimistic mutation layer.
//!
//! Every write applies its local change to the aggregate first, performs
//! the remote write under the request timeout, then either reconciles the
//! speculative record with the stored one or undoes exactly its own change
//! and posts an error notice. Failures never escalate to the session.

mod chat;
mod companion;
mod journal;
mod mood;
mod profile;
mod stories;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use venti_core::{Clock, Companion, Profile, ProfileFields};
use venti_storage::{ProfileStore, RecordStore};

pub use chat::ChatExchange;
pub use companion::EMPTY_WEEK_SUMMARY;
pub use profile::{OnboardingAnswers, TaskOutcome};

use crate::deadline::within;
use crate::error::ServiceError;
use crate::notice::NoticeBoard;
use crate::state::StateContainer;

pub struct Mutations {
    state: Arc<StateContainer>,
    store: Arc<dyn RecordStore>,
    companion: Arc<dyn Companion>,
    notices: Arc<NoticeBoard>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    chat_busy: AtomicBool,
    /// Mood writes per (epoch, date); locked before the state container.
    mood_writes: Mutex<HashMap<(u64, NaiveDate), mood::DateWrites>>,
}

impl Mutations {
    #[must_use]
    pub fn new(
        state: Arc<StateContainer>,
        store: Arc<dyn RecordStore>,
        companion: Arc<dyn Companion>,
        notices: Arc<NoticeBoard>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            state,
            store,
            companion,
            notices,
            clock,
            timeout,
            chat_busy: AtomicBool::new(false),
            mood_writes: Mutex::default(),
        }
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Write an already-applied profile patch, undoing it on failure.
    ///
    /// The undo skips keys that a later write has changed since.
    async fn commit_profile(
        &self,
        epoch: u64,
        user_id: &str,
        op: &'static str,
        patch: ProfileFields,
        undo: ProfileFields,
        failure: impl FnOnce(&ServiceError) -> String,
    ) -> Result<Profile, ServiceError> {
        match within(self.timeout, op, self.store.update_profile(user_id, &patch)).await {
            Ok(stored) => {
                // The store may normalize what it accepted; only the patched keys are taken back.
                let normalized = Profile::merge(user_id, stored.fields).capture(&patch);
                self.state
                    .update_data(epoch, |data| {
                        data.profile.apply(&normalized);
                        data.profile.clone()
                    })
                    .ok_or(ServiceError::Superseded)
            },
            Err(e) => {
                tracing::warn!(user_id, op, error = %e, "profile write failed, rolling back");
                self.state.update_data(epoch, |data| data.profile.revert(&patch, &undo));
                self.notices.error(failure(&e));
                Err(e)
            },
        }
    }

    /// Apply `patch` locally, then persist it.
    async fn patch_profile(
        &self,
        op: &'static str,
        patch: ProfileFields,
        failure: impl FnOnce(&ServiceError) -> String,
    ) -> Result<Profile, ServiceError> {
        let (epoch, user_id) = self.state.active()?;
        let undo = self
            .state
            .update_data(epoch, |data| {
                let undo = data.profile.capture(&patch);
                data.profile.apply(&patch);
                undo
            })
            .ok_or(ServiceError::NoSession)?;
        self.commit_profile(epoch, &user_id, op, patch, undo, failure).await
    }
}

/// Held while a chat exchange is in flight.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
