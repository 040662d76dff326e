use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use venti_core::{NewStory, RecordId, Story, StoryChanges};

use super::{Storage, fmt_ts, get_conn, parse_ts};
use crate::error::StorageError;

const STORY_COLUMNS: &str = "id, user_id, created_at, updated_at, title, content";

fn row_to_story(row: &Row<'_>) -> rusqlite::Result<Story> {
    Ok(Story {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_ts(2, &row.get::<_, String>(2)?)?,
        updated_at: parse_ts(3, &row.get::<_, String>(3)?)?,
        title: row.get(4)?,
        content: row.get(5)?,
    })
}

impl Storage {
    /// Stories of `user_id`, most recently updated first.
    ///
    /// # Errors
    /// Returns error if the query fails or a row cannot be decoded.
    pub fn list_stories(&self, user_id: &str) -> Result<Vec<Story>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {STORY_COLUMNS} FROM my_stories
             WHERE user_id = ?1 ORDER BY updated_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_story)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// # Errors
    /// Returns error if the insert fails.
    pub fn insert_story(&self, story: &NewStory) -> Result<Story, StorageError> {
        let now = fmt_ts(Utc::now());
        let conn = get_conn(&self.pool)?;
        let row = conn.query_row(
            &format!(
                "INSERT INTO my_stories (user_id, created_at, updated_at, title, content)
                 VALUES (?1, ?2, ?2, ?3, ?4) RETURNING {STORY_COLUMNS}"
            ),
            params![story.user_id, now, story.title, story.content],
            row_to_story,
        )?;
        Ok(row)
    }

    /// Replace title and content and bump `updated_at`.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if `user_id` owns no story `id`.
    pub fn update_story(
        &self,
        user_id: &str,
        id: RecordId,
        changes: &StoryChanges,
    ) -> Result<Story, StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.query_row(
            &format!(
                "UPDATE my_stories SET title = ?3, content = ?4, updated_at = ?5
                 WHERE id = ?1 AND user_id = ?2 RETURNING {STORY_COLUMNS}"
            ),
            params![id, user_id, changes.title, changes.content, fmt_ts(Utc::now())],
            row_to_story,
        )
        .optional()?
        .ok_or_else(|| StorageError::NotFound { entity: "story", id: id.to_string() })
    }

    /// # Errors
    /// Returns `StorageError::NotFound` if `user_id` owns no story `id`.
    pub fn delete_story(&self, user_id: &str, id: RecordId) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let deleted = conn
            .execute("DELETE FROM my_stories WHERE id = ?1 AND user_id = ?2", params![id, user_id])?;
        if deleted == 0 {
            return Err(StorageError::NotFound { entity: "story", id: id.to_string() });
        }
        Ok(())
    }
}
