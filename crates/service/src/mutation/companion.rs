use chrono::Duration;
use venti_core::constants::WEEKLY_SUMMARY_DAYS;
use venti_core::{JournalEntry, MoodEntry, PersonaMessage, confirmed_records};

use super::Mutations;
use crate::deadline::within;
use crate::error::ServiceError;

/// Returned without asking the companion when the past week is empty.
pub const EMPTY_WEEK_SUMMARY: &str = "There's nothing from this week to reflect on yet. \
Log a mood or write a journal entry and your weekly summary will be ready here.";

impl Mutations {
    /// Reflection over the journal entries and moods of the last seven days.
    pub async fn weekly_summary(&self) -> Result<String, ServiceError> {
        let data = self.state.user_data().ok_or(ServiceError::NoSession)?;
        let since = self.clock.today() - Duration::days(WEEKLY_SUMMARY_DAYS - 1);
        let entries: Vec<JournalEntry> = confirmed_records(&data.journal_entries)
            .filter(|e| self.clock.date_of(e.created_at) >= since)
            .cloned()
            .collect();
        let moods: Vec<MoodEntry> = confirmed_records(&data.moods)
            .filter(|m| m.date >= since)
            .cloned()
            .collect();
        if entries.is_empty() && moods.is_empty() {
            return Ok(EMPTY_WEEK_SUMMARY.to_owned());
        }

        within(self.timeout, "weekly summary", self.companion.weekly_summary(&entries, &moods))
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "weekly summary failed");
                self.notices.error("Could not generate your weekly summary. Please try again.");
            })
    }

    /// Next one to three messages of the simulated support group.
    pub async fn community_reply(
        &self,
        history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, ServiceError> {
        within(self.timeout, "community reply", self.companion.community_reply(history))
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "community reply failed");
                self.notices.error("The group is quiet right now. Please try again.");
            })
    }

    pub async fn community_story(&self, topic: &str) -> Result<String, ServiceError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ServiceError::InvalidInput("topic must not be empty".to_owned()));
        }
        within(self.timeout, "community story", self.companion.community_story(topic))
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "community story failed");
                self.notices.error("Could not load a story right now. Please try again.");
            })
    }
}
