//! Per-user record collections: journal, moods, stories, chat.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MOOD_MAX, MOOD_MIN};
use crate::error::CoreError;

/// Store-assigned primary key.
pub type RecordId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: RecordId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub content: String,
    pub mood: u8,
}

/// At most one per (user, date); writes are upserts keyed on that pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodEntry {
    pub id: RecordId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub mood: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Story {
    pub id: RecordId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "model")]
    Assistant,
}

impl ChatRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for ChatRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" | "model" => Ok(Self::Assistant),
            _ => Err(CoreError::InvalidChatRole(s.to_owned())),
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered by `created_at` ascending within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: RecordId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewJournalEntry {
    pub user_id: String,
    pub prompt: Option<String>,
    pub content: String,
    pub mood: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewMood {
    pub user_id: String,
    pub date: NaiveDate,
    pub mood: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStory {
    pub user_id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryChanges {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewChatMessage {
    pub user_id: String,
    pub role: ChatRole,
    pub text: String,
}

/// Reject mood scores outside `MOOD_MIN..=MOOD_MAX`.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when the score is out of range.
pub fn validate_mood(mood: u8) -> Result<u8, CoreError> {
    if (MOOD_MIN..=MOOD_MAX).contains(&mood) {
        Ok(mood)
    } else {
        Err(CoreError::InvalidInput(format!(
            "mood must be between {MOOD_MIN} and {MOOD_MAX}, got {mood}"
        )))
    }
}
