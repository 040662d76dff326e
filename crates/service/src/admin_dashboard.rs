//! Client-side user administration.
//!
//! Role changes are not optimistic: the cached listing changes only after
//! the privileged function confirms.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use venti_core::{AdminApi, AdminUserView, Permissions, Role};

use crate::deadline::within;
use crate::error::ServiceError;
use crate::notice::NoticeBoard;
use crate::state::StateContainer;

pub struct AdminDashboard {
    api: Arc<dyn AdminApi>,
    state: Arc<StateContainer>,
    notices: Arc<NoticeBoard>,
    timeout: Duration,
    users: RwLock<Vec<AdminUserView>>,
}

impl AdminDashboard {
    #[must_use]
    pub fn new(
        api: Arc<dyn AdminApi>,
        state: Arc<StateContainer>,
        notices: Arc<NoticeBoard>,
        timeout: Duration,
    ) -> Self {
        Self { api, state, notices, timeout, users: RwLock::new(Vec::new()) }
    }

    fn permissions(&self) -> Result<Permissions, ServiceError> {
        self.state.user_data().map(|d| d.permissions).ok_or(ServiceError::NoSession)
    }

    fn refuse(&self) -> ServiceError {
        self.notices.error("Not authorized");
        ServiceError::Unauthorized("Not authorized".to_owned())
    }

    #[must_use]
    pub fn users(&self) -> Vec<AdminUserView> {
        self.users.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub async fn load_users(&self) -> Result<Vec<AdminUserView>, ServiceError> {
        if !self.permissions()?.can_admin {
            return Err(self.refuse());
        }
        match within(self.timeout, "admin user list", self.api.list_users()).await {
            Ok(users) => {
                *self.users.write().unwrap_or_else(PoisonError::into_inner) = users.clone();
                Ok(users)
            },
            Err(e) => {
                tracing::warn!(error = %e, "user list failed");
                self.notices.error("Failed to fetch user data. You may not have permission.");
                Err(e)
            },
        }
    }

    pub async fn change_role(&self, target: &str, role: Role) -> Result<(), ServiceError> {
        if !self.permissions()?.can_super_admin {
            return Err(self.refuse());
        }
        match within(self.timeout, "admin role update", self.api.update_role(target, role)).await {
            Ok(()) => {
                let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
                if let Some(user) = users.iter_mut().find(|u| u.profile.id == target) {
                    user.profile.role = role;
                }
                drop(users);
                self.notices.success("User role updated successfully.");
                Ok(())
            },
            Err(e) => {
                tracing::warn!(target, error = %e, "role update failed");
                let message = match &e {
                    ServiceError::Remote(remote) => remote.to_string(),
                    _ => "Failed to update role.".to_owned(),
                };
                self.notices.error(message);
                Err(e)
            },
        }
    }
}
