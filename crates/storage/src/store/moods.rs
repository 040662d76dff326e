use chrono::Utc;
use rusqlite::{Row, params};
use venti_core::{MoodEntry, NewMood};

use super::{Storage, fmt_ts, get_conn, mood_from_sql, parse_date, parse_ts};
use crate::error::StorageError;

fn row_to_mood(row: &Row<'_>) -> rusqlite::Result<MoodEntry> {
    Ok(MoodEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_ts(2, &row.get::<_, String>(2)?)?,
        date: parse_date(3, &row.get::<_, String>(3)?)?,
        mood: mood_from_sql(4, row.get(4)?)?,
    })
}

impl Storage {
    /// Moods of `user_id`, newest date first.
    ///
    /// # Errors
    /// Returns error if the query fails or a row cannot be decoded.
    pub fn list_moods(&self, user_id: &str) -> Result<Vec<MoodEntry>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, created_at, date, mood FROM moods
             WHERE user_id = ?1 ORDER BY date DESC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_mood)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert or replace the mood for `(user_id, date)`; the row keeps its id.
    ///
    /// # Errors
    /// Returns error if the upsert fails.
    pub fn upsert_mood(&self, mood: &NewMood) -> Result<MoodEntry, StorageError> {
        let conn = get_conn(&self.pool)?;
        let row = conn.query_row(
            "INSERT INTO moods (user_id, created_at, date, mood) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, date) DO UPDATE SET mood = excluded.mood
             RETURNING id, user_id, created_at, date, mood",
            params![mood.user_id, fmt_ts(Utc::now()), mood.date.to_string(), i64::from(mood.mood)],
            row_to_mood,
        )?;
        Ok(row)
    }
}
