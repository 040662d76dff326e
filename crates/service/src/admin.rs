//! Privileged user administration, evaluated on the server for the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use venti_core::{AdminUserView, Identity, Profile, ProfileFields, Role};
use venti_storage::{AccountStore, ProfileStore};

use crate::deadline::within;
use crate::error::ServiceError;

/// E-mail shown for profiles whose account has no address.
pub const MISSING_EMAIL: &str = "N/A";

pub struct AdminService {
    profiles: Arc<dyn ProfileStore>,
    accounts: Arc<dyn AccountStore>,
    timeout: Duration,
}

impl AdminService {
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        accounts: Arc<dyn AccountStore>,
        timeout: Duration,
    ) -> Self {
        Self { profiles, accounts, timeout }
    }

    async fn role_of(&self, id: &str) -> Result<Role, ServiceError> {
        let stored = within(self.timeout, "profile fetch", self.profiles.get_profile(id)).await?;
        Ok(stored.map_or(Role::User, |p| Profile::merge(id, p.fields).role))
    }

    /// Every profile with its account e-mail. Admins and superadmins only.
    pub async fn list_users(&self, caller: &Identity) -> Result<Vec<AdminUserView>, ServiceError> {
        if !self.role_of(&caller.id).await?.permissions().can_admin {
            tracing::warn!(caller = %caller.id, "user listing refused");
            return Err(ServiceError::Unauthorized("Not authorized".to_owned()));
        }
        let (profiles, accounts) = tokio::try_join!(
            within(self.timeout, "profile list", self.profiles.list_profiles()),
            within(self.timeout, "account list", self.accounts.list_accounts()),
        )?;
        let emails: HashMap<String, Option<String>> =
            accounts.into_iter().map(|a| (a.id, a.email)).collect();

        Ok(profiles
            .into_iter()
            .map(|stored| {
                let email = emails
                    .get(&stored.id)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| MISSING_EMAIL.to_owned());
                AdminUserView { profile: Profile::merge(&stored.id, stored.fields), email }
            })
            .collect())
    }

    /// Set `target`'s role to `new_role` (`user` or `admin`).
    ///
    /// Checked in order: the role is assignable, the caller is a superadmin,
    /// the caller is not changing their own role.
    pub async fn update_role(
        &self,
        caller: &Identity,
        target: &str,
        new_role: &str,
    ) -> Result<Role, ServiceError> {
        let role = new_role
            .parse::<Role>()
            .ok()
            .filter(|r| r.is_assignable())
            .ok_or_else(|| ServiceError::InvalidInput("Invalid role specified".to_owned()))?;
        if !self.role_of(&caller.id).await?.permissions().can_super_admin {
            tracing::warn!(caller = %caller.id, target, "role change refused");
            return Err(ServiceError::Unauthorized("Not authorized".to_owned()));
        }
        if caller.id == target {
            return Err(ServiceError::InvalidInput("Cannot change your own role".to_owned()));
        }

        let patch = ProfileFields { role: Some(role), ..ProfileFields::default() };
        within(self.timeout, "role update", self.profiles.update_profile(target, &patch)).await?;
        tracing::info!(caller = %caller.id, target, role = %role, "role updated");
        Ok(role)
    }
}
