//! Account administration against the local database.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use venti_core::{Identity, ProfileFields, Role};
use venti_service::{AdminService, LocalAuth, ServiceConfig};
use venti_storage::AccountStore;

use crate::open_storage;

pub(crate) fn signup(email: Option<String>, id: Option<String>) -> Result<()> {
    let storage = open_storage()?;
    if let Some(email) = email.as_deref() {
        if storage.find_account_by_email(email)?.is_some() {
            bail!("an account for {email} already exists");
        }
    }
    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let account = storage.create_account(&id, email.as_deref())?;
    let token = storage.issue_token(&account.id)?;
    tracing::info!(user_id = %account.id, "account created");
    println!("{}", serde_json::json!({"id": account.id, "token": token}));
    Ok(())
}

pub(crate) fn login(email: &str) -> Result<()> {
    let storage = open_storage()?;
    let account =
        storage.find_account_by_email(email)?.with_context(|| format!("no account for {email}"))?;
    let token = storage.issue_token(&account.id)?;
    println!("{token}");
    Ok(())
}

/// Operator override; the only way to grant `superadmin`.
pub(crate) fn set_role(user_id: &str, role: Role) -> Result<()> {
    let storage = open_storage()?;
    let account =
        storage.get_account(user_id)?.with_context(|| format!("no account with id {user_id}"))?;
    let patch = ProfileFields { role: Some(role), ..ProfileFields::default() };
    if storage.get_profile(user_id)?.is_some() {
        storage.update_profile(user_id, &patch)?;
    } else {
        let name = account.identity().default_display_name();
        storage.insert_profile(user_id, &ProfileFields { role: Some(role), ..ProfileFields::minimal(name) })?;
    }
    tracing::info!(user_id, %role, "role set");
    println!("{user_id} is now {role}");
    Ok(())
}

pub(crate) async fn users(token: &str) -> Result<()> {
    let config = ServiceConfig::from_env();
    let storage = open_storage()?;
    let accounts: Arc<dyn AccountStore> = Arc::clone(&storage) as Arc<dyn AccountStore>;
    let identity: Identity =
        LocalAuth::with_accounts(Arc::clone(&accounts)).sign_in_with_token(token).await?.identity;

    let admin = AdminService::new(storage, accounts, config.request_timeout);
    let users = admin.list_users(&identity).await?;
    println!("{}", serde_json::to_string_pretty(&users)?);
    Ok(())
}
