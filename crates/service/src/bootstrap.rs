//! Session bootstrap: resolve or create the profile, then fan out over the
//! four owned collections and assemble the aggregate.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use venti_core::{Collections, Identity, ProfileFields, StoredProfile, UserData};
use venti_storage::{
    ChatStore, JournalStore, MoodStore, ProfileStore, RecordStore, StorageError, StoryStore,
};

use crate::deadline::within;
use crate::error::{ServiceError, SessionFailure};

pub struct SessionBootstrapper {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl SessionBootstrapper {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Produce the aggregate for `identity`, or the fatal failure that blocks it.
    ///
    /// Only profile resolution can fail; a collection that cannot be loaded is
    /// replaced by an empty one.
    pub async fn establish_session(&self, identity: &Identity) -> Result<UserData, SessionFailure> {
        let stored = self.resolve_profile(identity).await.map_err(|failure| {
            tracing::error!(user_id = %identity.id, error = %failure, "profile unavailable");
            failure
        })?;
        let collections = self.load_collections(&identity.id).await;
        let data = UserData::assemble(&identity.id, stored.fields, collections);
        tracing::info!(
            user_id = %identity.id,
            journal = data.journal_entries.len(),
            moods = data.moods.len(),
            stories = data.stories.len(),
            chat = data.chat_history.len(),
            "session established"
        );
        Ok(data)
    }

    async fn resolve_profile(&self, identity: &Identity) -> Result<StoredProfile, SessionFailure> {
        let fetched = within(self.timeout, "profile fetch", self.store.get_profile(&identity.id))
            .await
            .map_err(|e| unavailable(format!("Connection failed: {e}")))?;
        if let Some(profile) = fetched {
            return Ok(profile);
        }

        let fields = ProfileFields::minimal(identity.default_display_name());
        match within(self.timeout, "profile create", self.store.insert_profile(&identity.id, &fields))
            .await
        {
            Ok(profile) => {
                tracing::info!(user_id = %identity.id, "profile created");
                Ok(profile)
            },
            Err(e) if e.is_conflict() => {
                tracing::debug!(user_id = %identity.id, "profile created concurrently, re-fetching");
                self.refetch(identity).await
            },
            Err(e) => Err(unavailable(format!("Unable to create profile: {e}"))),
        }
    }

    async fn refetch(&self, identity: &Identity) -> Result<StoredProfile, SessionFailure> {
        within(self.timeout, "profile fetch", self.store.get_profile(&identity.id))
            .await
            .and_then(|found| {
                found.ok_or_else(|| {
                    ServiceError::Storage(StorageError::NotFound {
                        entity: "profile",
                        id: identity.id.clone(),
                    })
                })
            })
            .map_err(|e| unavailable(format!("Connection failed: {e}")))
    }

    async fn load_collections(&self, user_id: &str) -> Collections {
        let (journal_entries, moods, stories, chat_history) = tokio::join!(
            self.collection(user_id, "journal", self.store.list_journal(user_id)),
            self.collection(user_id, "moods", self.store.list_moods(user_id)),
            self.collection(user_id, "stories", self.store.list_stories(user_id)),
            self.collection(user_id, "chat", self.store.list_chat(user_id)),
        );
        Collections { journal_entries, moods, stories, chat_history }
    }

    async fn collection<T>(
        &self,
        user_id: &str,
        name: &'static str,
        fetch: impl Future<Output = Result<Vec<T>, StorageError>>,
    ) -> Vec<T> {
        match within(self.timeout, name, fetch).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(user_id, collection = name, error = %e, "collection unavailable, continuing with none");
                Vec::new()
            },
        }
    }
}

fn unavailable(message: String) -> SessionFailure {
    SessionFailure::ProfileUnavailable { message }
}
