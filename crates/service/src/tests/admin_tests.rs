use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use venti_core::{AdminApi, AdminUserView, Identity, Profile, ProfileFields, RemoteError, Role};

use super::harness;
use crate::{AdminDashboard, AdminService, MISSING_EMAIL, ServiceError};

fn with_role(role: Role) -> ProfileFields {
    ProfileFields { role: Some(role), ..ProfileFields::minimal("x".to_owned()) }
}

fn admin_service(h: &super::Harness) -> AdminService {
    AdminService::new(h.store.clone(), h.store.clone(), Duration::from_secs(5))
}

#[tokio::test]
async fn listing_requires_admin() {
    let h = harness();
    h.storage.insert_profile("plain", &with_role(Role::User)).unwrap();
    let service = admin_service(&h);

    let err = service.list_users(&Identity::new("plain", None)).await.unwrap_err();
    assert!(err.is_unauthorized());
    // Unknown callers are treated as regular users.
    assert!(service.list_users(&Identity::new("ghost", None)).await.is_err());
}

#[tokio::test]
async fn listing_joins_emails() {
    let h = harness();
    h.storage.create_account("admin", Some("admin@example.com")).unwrap();
    h.storage.insert_profile("admin", &with_role(Role::Admin)).unwrap();
    h.storage.insert_profile("orphan", &with_role(Role::User)).unwrap();

    let users = admin_service(&h).list_users(&Identity::new("admin", None)).await.unwrap();
    assert_eq!(users.len(), 2);
    let email_of = |id: &str| users.iter().find(|u| u.profile.id == id).map(|u| u.email.clone());
    assert_eq!(email_of("admin").as_deref(), Some("admin@example.com"));
    assert_eq!(email_of("orphan").as_deref(), Some(MISSING_EMAIL));
    assert!(users.iter().all(|u| u.profile.program_day == 1));
}

#[tokio::test]
async fn role_change_checks_run_in_order() {
    let h = harness();
    h.storage.insert_profile("root", &with_role(Role::Superadmin)).unwrap();
    h.storage.insert_profile("admin", &with_role(Role::Admin)).unwrap();
    h.storage.insert_profile("target", &with_role(Role::User)).unwrap();
    let service = admin_service(&h);
    let root = Identity::new("root", None);
    let admin = Identity::new("admin", None);

    // An invalid role is reported before the caller is even looked at.
    let err = service.update_role(&admin, "target", "superadmin").await.unwrap_err();
    assert_eq!(err.to_string(), "invalid input: Invalid role specified");

    let err = service.update_role(&admin, "target", "admin").await.unwrap_err();
    assert!(err.is_unauthorized());

    let err = service.update_role(&root, "root", "user").await.unwrap_err();
    assert_eq!(err.to_string(), "invalid input: Cannot change your own role");

    assert_eq!(service.update_role(&root, "target", "admin").await.unwrap(), Role::Admin);
    let stored = h.storage.get_profile("target").unwrap().unwrap();
    assert_eq!(stored.fields.role, Some(Role::Admin));

    let err = service.update_role(&root, "nobody", "admin").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn refused_role_change_leaves_listing_unchanged() {
    let h = harness();
    h.storage.insert_profile("admin", &with_role(Role::Admin)).unwrap();
    h.storage.insert_profile("target", &with_role(Role::User)).unwrap();
    let service = admin_service(&h);
    let admin = Identity::new("admin", None);

    assert!(service.update_role(&admin, "target", "admin").await.unwrap_err().is_unauthorized());
    let users = service.list_users(&admin).await.unwrap();
    let target = users.iter().find(|u| u.profile.id == "target").unwrap();
    assert_eq!(target.profile.role, Role::User);
}

/// Privileged functions double that records role changes.
struct StubAdminApi {
    users: Mutex<Vec<AdminUserView>>,
    refuse_with: Option<RemoteError>,
}

impl StubAdminApi {
    fn new(refuse_with: Option<RemoteError>) -> Self {
        let user = AdminUserView { profile: Profile::defaults("target"), email: "t@example.com".to_owned() };
        Self { users: Mutex::new(vec![user]), refuse_with }
    }
}

#[async_trait]
impl AdminApi for StubAdminApi {
    async fn list_users(&self) -> Result<Vec<AdminUserView>, RemoteError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_role(&self, target_user_id: &str, new_role: Role) -> Result<(), RemoteError> {
        if let Some(err) = &self.refuse_with {
            return Err(err.clone());
        }
        for user in self.users.lock().unwrap().iter_mut().filter(|u| u.profile.id == target_user_id) {
            user.profile.role = new_role;
        }
        Ok(())
    }
}

async fn dashboard_for(role: Role, api: Arc<StubAdminApi>) -> (super::Harness, AdminDashboard) {
    let h = harness();
    h.storage.insert_profile("me", &with_role(role)).unwrap();
    h.sign_in("me").await;
    let dashboard = AdminDashboard::new(
        api,
        h.session.state().clone(),
        h.session.notices().clone(),
        Duration::from_secs(5),
    );
    (h, dashboard)
}

#[tokio::test]
async fn dashboard_applies_role_only_after_confirmation() {
    let api = Arc::new(StubAdminApi::new(Some(RemoteError::Unauthorized("Not authorized".to_owned()))));
    let (h, dashboard) = dashboard_for(Role::Superadmin, api).await;
    dashboard.load_users().await.unwrap();

    let err = dashboard.change_role("target", Role::Admin).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(dashboard.users()[0].profile.role, Role::User);
    assert_eq!(h.last_notice().as_deref(), Some("Not authorized: Not authorized"));
}

#[tokio::test]
async fn dashboard_updates_cache_on_success() {
    let api = Arc::new(StubAdminApi::new(None));
    let (h, dashboard) = dashboard_for(Role::Superadmin, api).await;
    dashboard.load_users().await.unwrap();

    dashboard.change_role("target", Role::Admin).await.unwrap();
    assert_eq!(dashboard.users()[0].profile.role, Role::Admin);
    assert_eq!(h.last_notice().as_deref(), Some("User role updated successfully."));
}

#[tokio::test]
async fn dashboard_is_gated_by_permissions() {
    let api = Arc::new(StubAdminApi::new(None));
    let (_h, dashboard) = dashboard_for(Role::Admin, api.clone()).await;
    assert_eq!(dashboard.load_users().await.unwrap().len(), 1);
    assert!(matches!(
        dashboard.change_role("target", Role::Admin).await,
        Err(ServiceError::Unauthorized(_))
    ));
    assert_eq!(api.users.lock().unwrap()[0].profile.role, Role::User);

    let (_h, dashboard) = dashboard_for(Role::User, api).await;
    assert!(dashboard.load_users().await.is_err());
}
