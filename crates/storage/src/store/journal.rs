use chrono::Utc;
use rusqlite::{Row, params};
use venti_core::{JournalEntry, NewJournalEntry, RecordId};

use super::{Storage, fmt_ts, get_conn, mood_from_sql, parse_ts};
use crate::error::StorageError;

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_ts(2, &row.get::<_, String>(2)?)?,
        prompt: row.get(3)?,
        content: row.get(4)?,
        mood: mood_from_sql(5, row.get(5)?)?,
    })
}

impl Storage {
    /// Journal entries of `user_id`, newest first.
    ///
    /// # Errors
    /// Returns error if the query fails or a row cannot be decoded.
    pub fn list_journal(&self, user_id: &str) -> Result<Vec<JournalEntry>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, created_at, prompt, content, mood FROM journal_entries
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_entry)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// # Errors
    /// Returns error if the insert fails.
    pub fn insert_journal(&self, entry: &NewJournalEntry) -> Result<JournalEntry, StorageError> {
        let conn = get_conn(&self.pool)?;
        let row = conn.query_row(
            "INSERT INTO journal_entries (user_id, created_at, prompt, content, mood)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, created_at, prompt, content, mood",
            params![
                entry.user_id,
                fmt_ts(Utc::now()),
                entry.prompt,
                entry.content,
                i64::from(entry.mood)
            ],
            row_to_entry,
        )?;
        Ok(row)
    }

    /// Delete one of `user_id`'s entries.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the entry does not exist or belongs
    /// to someone else.
    pub fn delete_journal(&self, user_id: &str, id: RecordId) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let deleted = conn.execute(
            "DELETE FROM journal_entries WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(StorageError::NotFound { entity: "journal entry", id: id.to_string() });
        }
        Ok(())
    }
}
