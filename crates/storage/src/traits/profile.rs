use async_trait::async_trait;
use venti_core::{ProfileFields, StoredProfile};

use crate::error::StorageError;

/// Profile rows, one per identity.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get profile by identity; `None` if it does not exist yet.
    async fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>, StorageError>;

    /// Create the profile. Fails with a conflict-kind error if one already exists.
    async fn insert_profile(
        &self,
        id: &str,
        fields: &ProfileFields,
    ) -> Result<StoredProfile, StorageError>;

    /// Overwrite the present fields. Fails with a not-found-kind error if absent.
    async fn update_profile(
        &self,
        id: &str,
        fields: &ProfileFields,
    ) -> Result<StoredProfile, StorageError>;

    async fn list_profiles(&self) -> Result<Vec<StoredProfile>, StorageError>;

    /// Delete the profile and all records it owns. Returns `true` if it existed.
    async fn delete_profile(&self, id: &str) -> Result<bool, StorageError>;
}
