//! Async trait implementations for SQLite `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use venti_core::{
    ChatMessage, JournalEntry, MoodEntry, NewChatMessage, NewJournalEntry, NewMood, NewStory,
    ProfileFields, RecordId, Story, StoryChanges, StoredProfile,
};

use crate::Storage;
use crate::error::StorageError;
use crate::traits::{AccountStore, ChatStore, JournalStore, MoodStore, ProfileStore, StoryStore};
use crate::types::Account;

/// Run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Task(format!("spawn_blocking join error: {e}")))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`: `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`: `.to_owned()` a `&str`, pass as `&arg`
/// - `@opt_str arg`: `.map(ToOwned::to_owned)` an `Option<&str>`, pass as `arg.as_deref()`
/// - `@val arg`: move directly (Copy/owned types)
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@capture opt_str $arg:ident) => { let $arg = $arg.map(ToOwned::to_owned); };
    (@capture val $arg:ident) => { };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
    (@pass opt_str $arg:ident) => { $arg.as_deref() };
    (@pass val $arg:ident) => { $arg };
}

// ── ProfileStore ─────────────────────────────────────────────────

#[async_trait]
impl ProfileStore for Storage {
    async fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>, StorageError> {
        delegate!(self, get_profile, @str id)
    }
    async fn insert_profile(
        &self,
        id: &str,
        fields: &ProfileFields,
    ) -> Result<StoredProfile, StorageError> {
        delegate!(self, insert_profile, @str id, @ref fields)
    }
    async fn update_profile(
        &self,
        id: &str,
        fields: &ProfileFields,
    ) -> Result<StoredProfile, StorageError> {
        delegate!(self, update_profile, @str id, @ref fields)
    }
    async fn list_profiles(&self) -> Result<Vec<StoredProfile>, StorageError> {
        delegate!(self, list_profiles)
    }
    async fn delete_profile(&self, id: &str) -> Result<bool, StorageError> {
        delegate!(self, delete_profile, @str id)
    }
}

// ── Collections ──────────────────────────────────────────────────

#[async_trait]
impl JournalStore for Storage {
    async fn list_journal(&self, user_id: &str) -> Result<Vec<JournalEntry>, StorageError> {
        delegate!(self, list_journal, @str user_id)
    }
    async fn insert_journal(&self, entry: &NewJournalEntry) -> Result<JournalEntry, StorageError> {
        delegate!(self, insert_journal, @ref entry)
    }
    async fn delete_journal(&self, user_id: &str, id: RecordId) -> Result<(), StorageError> {
        delegate!(self, delete_journal, @str user_id, @val id)
    }
}

#[async_trait]
impl MoodStore for Storage {
    async fn list_moods(&self, user_id: &str) -> Result<Vec<MoodEntry>, StorageError> {
        delegate!(self, list_moods, @str user_id)
    }
    async fn upsert_mood(&self, mood: &NewMood) -> Result<MoodEntry, StorageError> {
        delegate!(self, upsert_mood, @ref mood)
    }
}

#[async_trait]
impl StoryStore for Storage {
    async fn list_stories(&self, user_id: &str) -> Result<Vec<Story>, StorageError> {
        delegate!(self, list_stories, @str user_id)
    }
    async fn insert_story(&self, story: &NewStory) -> Result<Story, StorageError> {
        delegate!(self, insert_story, @ref story)
    }
    async fn update_story(
        &self,
        user_id: &str,
        id: RecordId,
        changes: &StoryChanges,
    ) -> Result<Story, StorageError> {
        delegate!(self, update_story, @str user_id, @val id, @ref changes)
    }
    async fn delete_story(&self, user_id: &str, id: RecordId) -> Result<(), StorageError> {
        delegate!(self, delete_story, @str user_id, @val id)
    }
}

#[async_trait]
impl ChatStore for Storage {
    async fn list_chat(&self, user_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        delegate!(self, list_chat, @str user_id)
    }
    async fn insert_chat(&self, message: &NewChatMessage) -> Result<ChatMessage, StorageError> {
        delegate!(self, insert_chat, @ref message)
    }
}

// ── AccountStore ─────────────────────────────────────────────────

#[async_trait]
impl AccountStore for Storage {
    async fn create_account(&self, id: &str, email: Option<&str>) -> Result<Account, StorageError> {
        delegate!(self, create_account, @str id, @opt_str email)
    }
    async fn get_account(&self, id: &str) -> Result<Option<Account>, StorageError> {
        delegate!(self, get_account, @str id)
    }
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        delegate!(self, find_account_by_email, @str email)
    }
    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        delegate!(self, list_accounts)
    }
    async fn issue_token(&self, account_id: &str) -> Result<String, StorageError> {
        delegate!(self, issue_token, @str account_id)
    }
    async fn resolve_token(&self, token: &str) -> Result<Option<Account>, StorageError> {
        delegate!(self, resolve_token, @str token)
    }
    async fn revoke_token(&self, token: &str) -> Result<bool, StorageError> {
        delegate!(self, revoke_token, @str token)
    }
}
