use std::sync::PoisonError;

use chrono::NaiveDate;
use venti_core::{Entry, MoodEntry, NewMood, TempId, validate_mood};
use venti_storage::MoodStore;

use super::Mutations;
use crate::deadline::within;
use crate::error::ServiceError;

/// Unresolved writes to one date and the record the store last accepted for it.
#[derive(Debug, Default)]
pub(super) struct DateWrites {
    /// Issue order; the newest one is what the aggregate shows.
    in_flight: Vec<(TempId, MoodEntry)>,
    settled: Option<MoodEntry>,
}

impl DateWrites {
    fn shown(&self) -> Option<Entry<MoodEntry>> {
        match self.in_flight.last() {
            Some((temp, record)) => Some(Entry::pending(*temp, record.clone())),
            None => self.settled.clone().map(Entry::confirmed),
        }
    }
}

/// Put the slot for `date` in line with `writes`, keeping newest-date-first order.
fn show_mood(moods: &mut Vec<Entry<MoodEntry>>, date: NaiveDate, writes: &DateWrites) {
    let slot = moods.iter().position(|e| e.record().date == date);
    match (slot, writes.shown()) {
        (Some(idx), Some(entry)) => moods[idx] = entry,
        (Some(idx), None) => {
            moods.remove(idx);
        },
        (None, Some(entry)) => {
            let idx = moods.iter().position(|e| e.record().date < date).unwrap_or(moods.len());
            moods.insert(idx, entry);
        },
        (None, None) => {},
    }
}

impl Mutations {
    pub async fn log_mood_today(&self, mood: u8) -> Result<MoodEntry, ServiceError> {
        self.log_mood(self.clock.today(), mood).await
    }

    /// Upsert the mood for `date`. Logging the same date twice keeps one entry.
    ///
    /// Overlapping logs for one date settle on whatever the store answered
    /// last; a failed log falls back to the newest write still outstanding.
    pub async fn log_mood(&self, date: NaiveDate, mood: u8) -> Result<MoodEntry, ServiceError> {
        let mood = validate_mood(mood)?;
        let (epoch, user_id) = self.state.active()?;
        let temp = TempId::new();
        let now = self.clock.now();

        {
            let mut ledger = self.mood_writes.lock().unwrap_or_else(PoisonError::into_inner);
            self.state
                .update_data(epoch, |data| {
                    let existing = data.moods.iter().find(|e| e.record().date == date);
                    let writes = ledger.entry((epoch, date)).or_insert_with(|| DateWrites {
                        in_flight: Vec::new(),
                        settled: existing.filter(|e| !e.is_pending()).map(|e| e.record().clone()),
                    });
                    let mut record = existing.map_or_else(
                        || MoodEntry { id: 0, user_id: user_id.clone(), created_at: now, date, mood },
                        |e| e.record().clone(),
                    );
                    record.mood = mood;
                    writes.in_flight.push((temp, record));
                    show_mood(&mut data.moods, date, writes);
                })
                .ok_or(ServiceError::NoSession)?;
        }

        let request = NewMood { user_id: user_id.clone(), date, mood };
        match within(self.timeout, "mood upsert", self.store.upsert_mood(&request)).await {
            Ok(saved) => {
                self.settle_mood(epoch, date, temp, Some(saved.clone()));
                self.notices.success("Mood for today logged. Great job checking in!");
                Ok(saved)
            },
            Err(e) => {
                tracing::warn!(user_id, %date, error = %e, "mood upsert failed, rolling back");
                self.settle_mood(epoch, date, temp, None);
                self.notices.error("Error logging mood. Please try again.");
                Err(e)
            },
        }
    }

    /// Retire the write `temp`, recording `saved` if the store accepted it.
    fn settle_mood(&self, epoch: u64, date: NaiveDate, temp: TempId, saved: Option<MoodEntry>) {
        let mut ledger = self.mood_writes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(writes) = ledger.get_mut(&(epoch, date)) else {
            return;
        };
        writes.in_flight.retain(|(t, _)| *t != temp);
        if saved.is_some() {
            writes.settled = saved;
        }
        // A stale epoch leaves the aggregate alone; the ledger entry still goes.
        self.state.update_data(epoch, |data| show_mood(&mut data.moods, date, writes));
        if writes.in_flight.is_empty() {
            ledger.remove(&(epoch, date));
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[expect(clippy::unwrap_used, reason = "test code")]
    fn record(date: &str, mood: u8) -> MoodEntry {
        MoodEntry { id: 1, user_id: "u1".to_owned(), created_at: Utc::now(), date: date.parse().unwrap(), mood }
    }

    #[test]
    fn newest_outstanding_write_is_shown() {
        let d: NaiveDate = "2024-01-02".parse().unwrap();
        let (a, b) = (TempId::new(), TempId::new());
        let writes = DateWrites {
            in_flight: vec![(a, record("2024-01-02", 7)), (b, record("2024-01-02", 3))],
            settled: None,
        };
        let mut moods = vec![Entry::confirmed(record("2024-01-03", 4)), Entry::confirmed(record("2024-01-01", 2))];
        show_mood(&mut moods, d, &writes);

        assert_eq!(moods.len(), 3);
        assert_eq!(moods[1].temp_id(), Some(b));
        assert_eq!(moods[1].record().mood, 3);
    }

    #[test]
    fn nothing_settled_or_outstanding_removes_the_slot() {
        let d: NaiveDate = "2024-01-02".parse().unwrap();
        let mut moods = vec![Entry::pending(TempId::new(), record("2024-01-02", 3))];
        show_mood(&mut moods, d, &DateWrites::default());
        assert!(moods.is_empty());
    }
}
