use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use venti_core::{ProfileFields, StoredProfile};

use super::{Storage, fmt_ts, get_conn, parse_date, parse_enum, parse_json};
use crate::error::StorageError;

const PROFILE_COLUMNS: &str = "id, name, role, onboarding_complete, anonymous_display_name, \
     breakup_context, chapter_name, shield_list, baseline, program, program_day, \
     last_task_completed_date, streaks, emergency_contact";

fn json_value<T: serde::Serialize>(value: &T) -> Result<Value, StorageError> {
    Ok(Value::Text(serde_json::to_string(value)?))
}

fn nullable<T>(value: Option<T>, f: impl FnOnce(T) -> Result<Value, StorageError>) -> Result<Value, StorageError> {
    value.map_or(Ok(Value::Null), f)
}

/// Column/value pairs for every field present in `fields`.
fn profile_columns(fields: &ProfileFields) -> Result<Vec<(&'static str, Value)>, StorageError> {
    let mut cols = Vec::new();
    if let Some(name) = &fields.name {
        cols.push(("name", Value::Text(name.clone())));
    }
    if let Some(role) = fields.role {
        cols.push(("role", Value::Text(role.as_str().to_owned())));
    }
    if let Some(done) = fields.onboarding_complete {
        cols.push(("onboarding_complete", Value::Integer(i64::from(done))));
    }
    if let Some(display) = &fields.anonymous_display_name {
        cols.push(("anonymous_display_name", nullable(display.clone(), |v| Ok(Value::Text(v)))?));
    }
    if let Some(context) = &fields.breakup_context {
        cols.push(("breakup_context", json_value(context)?));
    }
    if let Some(chapter) = &fields.chapter_name {
        cols.push(("chapter_name", Value::Text(chapter.clone())));
    }
    if let Some(shields) = &fields.shield_list {
        cols.push(("shield_list", json_value(shields)?));
    }
    if let Some(baseline) = &fields.baseline {
        cols.push(("baseline", json_value(baseline)?));
    }
    if let Some(program) = fields.program {
        cols.push(("program", nullable(program, |p| Ok(Value::Text(p.as_str().to_owned())))?));
    }
    if let Some(day) = fields.program_day {
        cols.push(("program_day", Value::Integer(i64::from(day))));
    }
    if let Some(date) = fields.last_task_completed_date {
        cols.push(("last_task_completed_date", nullable(date, |d| Ok(Value::Text(d.to_string())))?));
    }
    if let Some(streaks) = &fields.streaks {
        cols.push(("streaks", json_value(streaks)?));
    }
    if let Some(contact) = &fields.emergency_contact {
        cols.push(("emergency_contact", nullable(contact.as_ref(), json_value)?));
    }
    Ok(cols)
}

/// NULL columns are "absent"; nullable profile fields come back as `Some(Some(_))`.
fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<StoredProfile> {
    let text = |idx: usize| row.get::<_, Option<String>>(idx);

    let fields = ProfileFields {
        name: text(1)?,
        role: text(2)?.map(|r| parse_enum(2, &r)).transpose()?,
        onboarding_complete: row.get(3)?,
        anonymous_display_name: text(4)?.map(Some),
        breakup_context: text(5)?.map(|s| parse_json(5, &s)).transpose()?,
        chapter_name: text(6)?,
        shield_list: text(7)?.map(|s| parse_json(7, &s)).transpose()?,
        baseline: text(8)?.map(|s| parse_json(8, &s)).transpose()?,
        program: text(9)?.map(|p| parse_enum(9, &p).map(Some)).transpose()?,
        program_day: row.get(10)?,
        last_task_completed_date: text(11)?.map(|d| parse_date(11, &d).map(Some)).transpose()?,
        streaks: text(12)?.map(|s| parse_json(12, &s)).transpose()?,
        emergency_contact: text(13)?.map(|s| parse_json(13, &s).map(Some)).transpose()?,
    };
    Ok(StoredProfile { id: row.get(0)?, fields })
}

impl Storage {
    /// Get profile by identity.
    ///
    /// # Errors
    /// Returns error if the query fails or a column cannot be decoded.
    pub fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], row_to_profile).optional()?)
    }

    /// Insert a new profile row.
    ///
    /// # Errors
    /// Returns `StorageError::Conflict` if a profile with this id already exists.
    pub fn insert_profile(
        &self,
        id: &str,
        fields: &ProfileFields,
    ) -> Result<StoredProfile, StorageError> {
        let cols = profile_columns(fields)?;
        let now = fmt_ts(Utc::now());

        let mut names = vec!["id", "created_at", "updated_at"];
        names.extend(cols.iter().map(|(name, _)| *name));
        let placeholders =
            (1..=names.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
        let sql = format!("INSERT INTO profiles ({}) VALUES ({placeholders})", names.join(", "));

        let mut values = vec![Value::Text(id.to_owned()), Value::Text(now.clone()), Value::Text(now)];
        values.extend(cols.into_iter().map(|(_, v)| v));

        let conn = get_conn(&self.pool)?;
        conn.execute(&sql, params_from_iter(values.iter()))?;
        drop(conn);

        tracing::debug!(user_id = id, "Inserted profile");
        self.require_profile(id)
    }

    /// Overwrite the fields present in `fields`.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if no profile exists for `id`.
    pub fn update_profile(
        &self,
        id: &str,
        fields: &ProfileFields,
    ) -> Result<StoredProfile, StorageError> {
        let cols = profile_columns(fields)?;
        let assignments: Vec<String> = cols
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{name} = ?{}", i + 3))
            .chain(std::iter::once("updated_at = ?2".to_owned()))
            .collect();
        let sql = format!("UPDATE profiles SET {} WHERE id = ?1", assignments.join(", "));

        let mut values = vec![Value::Text(id.to_owned()), Value::Text(fmt_ts(Utc::now()))];
        values.extend(cols.into_iter().map(|(_, v)| v));

        let conn = get_conn(&self.pool)?;
        let updated = conn.execute(&sql, params_from_iter(values.iter()))?;
        drop(conn);

        if updated == 0 {
            return Err(StorageError::NotFound { entity: "profile", id: id.to_owned() });
        }
        self.require_profile(id)
    }

    /// All profiles, oldest first.
    ///
    /// # Errors
    /// Returns error if the query fails or a row cannot be decoded.
    pub fn list_profiles(&self) -> Result<Vec<StoredProfile>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at, id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_profile)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete the profile and every collection record owned by `id`.
    /// Returns `true` if a profile row was deleted.
    ///
    /// # Errors
    /// Returns error if any delete fails; the transaction is rolled back.
    pub fn delete_profile(&self, id: &str) -> Result<bool, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        for table in ["journal_entries", "moods", "my_stories", "chat_history"] {
            tx.execute(&format!("DELETE FROM {table} WHERE user_id = ?1"), params![id])?;
        }
        let deleted = tx.execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
        tx.commit()?;
        tracing::info!(user_id = id, deleted = deleted > 0, "Deleted profile and owned records");
        Ok(deleted > 0)
    }

    fn require_profile(&self, id: &str) -> Result<StoredProfile, StorageError> {
        self.get_profile(id)?
            .ok_or_else(|| StorageError::NotFound { entity: "profile", id: id.to_owned() })
    }
}
