use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::Account;

/// Accounts and bearer tokens of the local identity provider.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, id: &str, email: Option<&str>) -> Result<Account, StorageError>;

    async fn get_account(&self, id: &str) -> Result<Option<Account>, StorageError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError>;

    async fn list_accounts(&self) -> Result<Vec<Account>, StorageError>;

    async fn issue_token(&self, account_id: &str) -> Result<String, StorageError>;

    async fn resolve_token(&self, token: &str) -> Result<Option<Account>, StorageError>;

    async fn revoke_token(&self, token: &str) -> Result<bool, StorageError>;
}
