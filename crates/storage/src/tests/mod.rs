//! Test utilities and module declarations for storage tests.

use tempfile::TempDir;
use venti_core::{NewChatMessage, NewJournalEntry, NewMood, NewStory, ChatRole};

use crate::Storage;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

pub fn journal(user_id: &str, content: &str) -> NewJournalEntry {
    NewJournalEntry {
        user_id: user_id.to_owned(),
        prompt: Some("What felt heavy today?".to_owned()),
        content: content.to_owned(),
        mood: 5,
    }
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn mood(user_id: &str, date: &str, mood: u8) -> NewMood {
    NewMood { user_id: user_id.to_owned(), date: date.parse().unwrap(), mood }
}

pub fn story(user_id: &str, title: &str) -> NewStory {
    NewStory { user_id: user_id.to_owned(), title: title.to_owned(), content: "Once...".to_owned() }
}

pub fn chat(user_id: &str, role: ChatRole, text: &str) -> NewChatMessage {
    NewChatMessage { user_id: user_id.to_owned(), role, text: text.to_owned() }
}


#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn migrations_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("venti.db");
    let first = Storage::new(&db_path).unwrap();
    drop(first);
    let storage = Storage::new(&db_path).unwrap();
    assert!(storage.list_profiles().unwrap().is_empty());
}
