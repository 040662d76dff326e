//! The per-session aggregate: profile plus the four owned collections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, confirmed_records};
use crate::profile::{Permissions, Profile, ProfileFields};
use crate::records::{ChatMessage, JournalEntry, MoodEntry, RecordId, Story};

/// Auxiliary collections as fetched from the store, before assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    pub journal_entries: Vec<JournalEntry>,
    pub moods: Vec<MoodEntry>,
    pub stories: Vec<Story>,
    pub chat_history: Vec<ChatMessage>,
}

/// Fully assembled in-memory user data for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub profile: Profile,
    pub permissions: Permissions,
    pub journal_entries: Vec<Entry<JournalEntry>>,
    pub moods: Vec<Entry<MoodEntry>>,
    pub stories: Vec<Entry<Story>>,
    pub chat_history: Vec<Entry<ChatMessage>>,
}

impl UserData {
    /// Merge stored profile fields over defaults (identity forced) and attach
    /// the collections as confirmed entries.
    #[must_use]
    pub fn assemble(identity: &str, stored: ProfileFields, collections: Collections) -> Self {
        let profile = Profile::merge(identity, stored);
        let permissions = profile.role.permissions();
        Self {
            profile,
            permissions,
            journal_entries: collections.journal_entries.into_iter().map(Entry::confirmed).collect(),
            moods: collections.moods.into_iter().map(Entry::confirmed).collect(),
            stories: collections.stories.into_iter().map(Entry::confirmed).collect(),
            chat_history: collections.chat_history.into_iter().map(Entry::confirmed).collect(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.profile.id
    }

    #[must_use]
    pub fn mood_on(&self, date: NaiveDate) -> Option<&MoodEntry> {
        self.moods.iter().map(Entry::record).find(|m| m.date == date)
    }

    #[must_use]
    pub fn story(&self, id: RecordId) -> Option<&Story> {
        self.stories.iter().map(Entry::record).find(|s| s.id == id)
    }

    /// Confirmed chat history, oldest first.
    #[must_use]
    pub fn confirmed_chat(&self) -> Vec<ChatMessage> {
        confirmed_records(&self.chat_history).cloned().collect()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.journal_entries.iter().any(Entry::is_pending)
            || self.moods.iter().any(Entry::is_pending)
            || self.stories.iter().any(Entry::is_pending)
            || self.chat_history.iter().any(Entry::is_pending)
    }
}
