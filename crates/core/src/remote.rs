//! Request/response collaborators: the generative-text companion and the
//! privileged admin functions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::UserData;
use crate::profile::{Profile, Role};
use crate::records::{ChatMessage, JournalEntry, MoodEntry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("User not authenticated.")]
    NotAuthenticated,
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Connection failed: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Authorization failures never mutate state and are reported as-is.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::Unauthorized(_))
    }
}

/// One simulated community member message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaMessage {
    pub name: String,
    pub text: String,
}

/// Row of the privileged user listing: profile plus account e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserView {
    #[serde(flatten)]
    pub profile: Profile,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub target_user_id: String,
    pub new_role: Role,
}

/// Opaque text-in / text-out generative dependency.
#[async_trait]
pub trait Companion: Send + Sync {
    /// Conversational reply to `message` given prior `history`.
    async fn reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        user_data: &UserData,
    ) -> Result<String, RemoteError>;

    async fn weekly_summary(
        &self,
        entries: &[JournalEntry],
        moods: &[MoodEntry],
    ) -> Result<String, RemoteError>;

    /// One to three persona-tagged messages continuing `history`.
    async fn community_reply(
        &self,
        history: &[PersonaMessage],
    ) -> Result<Vec<PersonaMessage>, RemoteError>;

    async fn community_story(&self, topic: &str) -> Result<String, RemoteError>;
}

/// Privileged functions that bypass per-user authorization.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<AdminUserView>, RemoteError>;

    async fn update_role(&self, target_user_id: &str, new_role: Role) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_change_request_wire_shape() {
        let req = RoleChangeRequest { target_user_id: "u2".to_owned(), new_role: Role::Admin };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"targetUserId": "u2", "newRole": "admin"}));
    }

    #[test]
    fn admin_view_flattens_profile() {
        let view = AdminUserView { profile: Profile::defaults("u1"), email: "a@b.c".to_owned() };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["email"], "a@b.c");
        assert_eq!(json["programDay"], 1);
    }
}
