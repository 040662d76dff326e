//! Typed API error for function handlers.
//!
//! Renders `{"error": message}` with a status code. `Internal` logs the real
//! error server-side and returns a static message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use venti_core::RemoteError;
use venti_service::{ServiceError, SessionFailure};
use venti_storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    /// 400: invalid input from the caller.
    BadRequest(String),
    /// 401: missing or unknown token, or insufficient role.
    Unauthorized(String),
    /// 404: target does not exist.
    NotFound(String),
    /// 500: details logged, not exposed.
    Internal(anyhow::Error),
    /// 503: a backend is missing or not answering.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(StorageError::NotFound { entity, id }) => {
                Self::NotFound(format!("{entity} '{id}' not found"))
            },
            ServiceError::Storage(StorageError::Conflict(msg)) => Self::BadRequest(msg),
            ServiceError::InvalidInput(msg) => Self::BadRequest(msg),
            ServiceError::Core(e) => Self::BadRequest(e.to_string()),
            ServiceError::Unauthorized(msg) => Self::Unauthorized(msg),
            ServiceError::Remote(RemoteError::Unauthorized(msg)) => Self::Unauthorized(msg),
            ServiceError::Remote(RemoteError::NotAuthenticated) => {
                Self::Unauthorized("Not authenticated".to_owned())
            },
            ServiceError::Remote(RemoteError::Rejected(msg)) => Self::BadRequest(msg),
            ServiceError::Remote(e) => {
                tracing::warn!(error = %e, "companion call failed");
                Self::ServiceUnavailable("The AI service is unavailable right now.".to_owned())
            },
            ServiceError::Timeout(op) => Self::ServiceUnavailable(format!("{op} timed out")),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        ServiceError::Remote(err).into()
    }
}

impl From<SessionFailure> for ApiError {
    fn from(failure: SessionFailure) -> Self {
        Self::ServiceUnavailable(failure.message().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        let err = ApiError::from(ServiceError::Storage(StorageError::NotFound {
            entity: "profile",
            id: "u9".to_owned(),
        }));
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "profile 'u9' not found"));
    }

    #[test]
    fn remote_auth_is_unauthorized() {
        let err = ApiError::from(RemoteError::Unauthorized("Not authorized".to_owned()));
        assert!(matches!(err, ApiError::Unauthorized(_)));
        let err = ApiError::from(RemoteError::Network("down".to_owned()));
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn response_body_is_error_object() {
        let response = ApiError::BadRequest("Invalid role specified".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
