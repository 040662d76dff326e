use venti_core::{
    Entry, JournalEntry, NewJournalEntry, RecordId, TempId, discard, reconcile, validate_mood,
};
use venti_storage::JournalStore;

use super::Mutations;
use crate::deadline::within;
use crate::error::ServiceError;

impl Mutations {
    /// New entries go to the front; the collection is newest first.
    pub async fn add_journal_entry(
        &self,
        prompt: Option<String>,
        content: &str,
        mood: u8,
    ) -> Result<JournalEntry, ServiceError> {
        let content = content.trim();
        if content.is_empty() {
            self.notices.error("Please write something before saving your entry.");
            return Err(ServiceError::InvalidInput("journal content must not be empty".to_owned()));
        }
        let mood = validate_mood(mood)?;
        let (epoch, user_id) = self.state.active()?;
        let temp = TempId::new();
        let record = JournalEntry {
            id: 0,
            user_id: user_id.clone(),
            created_at: self.clock.now(),
            prompt: prompt.clone(),
            content: content.to_owned(),
            mood,
        };
        self.state
            .update_data(epoch, |data| data.journal_entries.insert(0, Entry::pending(temp, record)))
            .ok_or(ServiceError::NoSession)?;

        let request = NewJournalEntry { user_id: user_id.clone(), prompt, content: content.to_owned(), mood };
        match within(self.timeout, "journal insert", self.store.insert_journal(&request)).await {
            Ok(saved) => {
                self.state
                    .update_data(epoch, |data| reconcile(&mut data.journal_entries, temp, saved.clone()));
                self.notices.success("Journal entry saved.");
                Ok(saved)
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "journal insert failed, rolling back");
                self.state.update_data(epoch, |data| discard(&mut data.journal_entries, temp));
                self.notices.error("Could not save journal entry. Please try again.");
                Err(e)
            },
        }
    }

    pub async fn delete_journal_entry(&self, id: RecordId) -> Result<(), ServiceError> {
        let (epoch, user_id) = self.state.active()?;
        let removed = self
            .state
            .update_data(epoch, |data| {
                let idx = data
                    .journal_entries
                    .iter()
                    .position(|e| !e.is_pending() && e.record().id == id)?;
                Some((idx, data.journal_entries.remove(idx)))
            })
            .ok_or(ServiceError::NoSession)?;
        let Some((idx, previous)) = removed else {
            return Err(ServiceError::InvalidInput(format!("no journal entry {id}")));
        };

        match within(self.timeout, "journal delete", self.store.delete_journal(&user_id, id)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(user_id, id, error = %e, "journal delete failed, restoring");
                self.state.update_data(epoch, |data| {
                    let idx = idx.min(data.journal_entries.len());
                    data.journal_entries.insert(idx, previous);
                });
                self.notices.error("Could not delete journal entry. Please try again.");
                Err(e)
            },
        }
    }
}
