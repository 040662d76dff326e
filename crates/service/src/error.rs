//! Typed error enums for the service layer.
//!
//! [`ServiceError`] unifies store, collaborator and local validation
//! failures; [`SessionFailure`] is the fatal bootstrap classification.

use thiserror::Error;
use venti_core::{AuthError, CoreError, RemoteError};
use venti_storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Store operation failed (not found, conflict, database, ...).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Companion or privileged function call failed.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Core(#[from] CoreError),

    /// Rejected locally before any remote call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller lacks the capability for this operation.
    #[error("{0}")]
    Unauthorized(String),

    /// No aggregate is loaded (signed out, loading, or failed bootstrap).
    #[error("no active session")]
    NoSession,

    /// Another operation of the same kind is still in flight.
    #[error("busy: {0}")]
    Busy(&'static str),

    /// Remote call exceeded the configured request timeout.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// The session changed (sign-out or re-bootstrap) while the call was in flight.
    #[error("session changed while the operation was in flight")]
    Superseded,
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Remote(RemoteError::Network(_) | RemoteError::Timeout) | Self::Timeout(_) => true,
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_conflict())
    }

    /// Authorization failure from a local check or a privileged function.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_)) || matches!(self, Self::Remote(e) if e.is_auth())
    }
}

/// Fatal, session-level failure: blocks app entry until retried or signed out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    /// The profile could not be fetched or created.
    #[error("{message}")]
    ProfileUnavailable { message: String },

    /// The auth provider could not report the current session.
    #[error("{message}")]
    SessionUnavailable { message: String },
}

impl SessionFailure {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ProfileUnavailable { message } | Self::SessionUnavailable { message } => message,
        }
    }
}

impl serde::Serialize for SessionFailure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_not_found_classification() {
        let conflict = ServiceError::from(StorageError::Conflict("dup".to_owned()));
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());

        let missing =
            ServiceError::from(StorageError::NotFound { entity: "profile", id: "u1".to_owned() });
        assert!(missing.is_not_found());
    }

    #[test]
    fn remote_auth_errors_are_unauthorized() {
        assert!(ServiceError::from(RemoteError::Unauthorized("Not authorized".to_owned())).is_unauthorized());
        assert!(ServiceError::from(RemoteError::NotAuthenticated).is_unauthorized());
        assert!(!ServiceError::from(RemoteError::Timeout).is_unauthorized());
        assert!(ServiceError::Timeout("mood upsert").is_transient());
    }

    #[test]
    fn failure_message_is_display() {
        let failure = SessionFailure::ProfileUnavailable { message: "Connection failed: x".to_owned() };
        assert_eq!(failure.message(), failure.to_string());
    }
}
