use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

use super::{Storage, fmt_ts, get_conn, parse_ts};
use crate::error::StorageError;
use crate::types::Account;

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at: parse_ts(2, &row.get::<_, String>(2)?)?,
    })
}

impl Storage {
    /// Register an account.
    ///
    /// # Errors
    /// Returns `StorageError::Conflict` if the id or e-mail is already taken.
    pub fn create_account(&self, id: &str, email: Option<&str>) -> Result<Account, StorageError> {
        let conn = get_conn(&self.pool)?;
        let account = conn.query_row(
            "INSERT INTO accounts (id, email, created_at) VALUES (?1, ?2, ?3)
             RETURNING id, email, created_at",
            params![id, email, fmt_ts(Utc::now())],
            row_to_account,
        )?;
        tracing::info!(account_id = %account.id, "Created account");
        Ok(account)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn get_account(&self, id: &str) -> Result<Option<Account>, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT id, email, created_at FROM accounts WHERE id = ?1",
                params![id],
                row_to_account,
            )
            .optional()?)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT id, email, created_at FROM accounts WHERE email = ?1",
                params![email],
                row_to_account,
            )
            .optional()?)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare("SELECT id, email, created_at FROM accounts ORDER BY created_at, id")?;
        let rows = stmt.query_map([], row_to_account)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Mint a new bearer token for `account_id`.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the account does not exist.
    pub fn issue_token(&self, account_id: &str) -> Result<String, StorageError> {
        if self.get_account(account_id)?.is_none() {
            return Err(StorageError::NotFound { entity: "account", id: account_id.to_owned() });
        }
        let token = Uuid::new_v4().simple().to_string();
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO access_tokens (token, account_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, account_id, fmt_ts(Utc::now())],
        )?;
        Ok(token)
    }

    /// Account owning `token`, if the token is live.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn resolve_token(&self, token: &str) -> Result<Option<Account>, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT a.id, a.email, a.created_at FROM access_tokens t
                 JOIN accounts a ON a.id = t.account_id WHERE t.token = ?1",
                params![token],
                row_to_account,
            )
            .optional()?)
    }

    /// Returns `true` if the token existed.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn revoke_token(&self, token: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let deleted = conn.execute("DELETE FROM access_tokens WHERE token = ?1", params![token])?;
        Ok(deleted > 0)
    }
}
