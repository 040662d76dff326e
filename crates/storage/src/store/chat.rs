use chrono::Utc;
use rusqlite::{Row, params};
use venti_core::{ChatMessage, NewChatMessage};

use super::{Storage, fmt_ts, get_conn, parse_enum, parse_ts};
use crate::error::StorageError;

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_ts(2, &row.get::<_, String>(2)?)?,
        role: parse_enum(3, &row.get::<_, String>(3)?)?,
        text: row.get(4)?,
    })
}

impl Storage {
    /// Chat history of `user_id`, oldest first. Ties on the timestamp keep
    /// insertion order.
    ///
    /// # Errors
    /// Returns error if the query fails or a row cannot be decoded.
    pub fn list_chat(&self, user_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, created_at, role, text FROM chat_history
             WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let rows =
            stmt.query_map(params![user_id], row_to_message)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// # Errors
    /// Returns error if the insert fails.
    pub fn insert_chat(&self, message: &NewChatMessage) -> Result<ChatMessage, StorageError> {
        let conn = get_conn(&self.pool)?;
        let row = conn.query_row(
            "INSERT INTO chat_history (user_id, created_at, role, text) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, created_at, role, text",
            params![message.user_id, fmt_ts(Utc::now()), message.role.as_str(), message.text],
            row_to_message,
        )?;
        Ok(row)
    }
}
