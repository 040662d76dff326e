use async_trait::async_trait;
use venti_core::{
    ChatMessage, JournalEntry, MoodEntry, NewChatMessage, NewJournalEntry, NewMood, NewStory,
    RecordId, Story, StoryChanges,
};

use crate::error::StorageError;

#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Newest first.
    async fn list_journal(&self, user_id: &str) -> Result<Vec<JournalEntry>, StorageError>;

    async fn insert_journal(&self, entry: &NewJournalEntry) -> Result<JournalEntry, StorageError>;

    async fn delete_journal(&self, user_id: &str, id: RecordId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait MoodStore: Send + Sync {
    /// Newest date first.
    async fn list_moods(&self, user_id: &str) -> Result<Vec<MoodEntry>, StorageError>;

    /// Upsert keyed by `(user_id, date)`; last write wins.
    async fn upsert_mood(&self, mood: &NewMood) -> Result<MoodEntry, StorageError>;
}

#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Most recently updated first.
    async fn list_stories(&self, user_id: &str) -> Result<Vec<Story>, StorageError>;

    async fn insert_story(&self, story: &NewStory) -> Result<Story, StorageError>;

    async fn update_story(
        &self,
        user_id: &str,
        id: RecordId,
        changes: &StoryChanges,
    ) -> Result<Story, StorageError>;

    async fn delete_story(&self, user_id: &str, id: RecordId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Oldest first.
    async fn list_chat(&self, user_id: &str) -> Result<Vec<ChatMessage>, StorageError>;

    async fn insert_chat(&self, message: &NewChatMessage) -> Result<ChatMessage, StorageError>;
}
