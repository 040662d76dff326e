//! Bearer-token authentication against the local account store.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use venti_core::Identity;

use crate::AppState;
use crate::api_error::ApiError;

/// Token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_owned()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_owned()))
}

impl AppState {
    /// Identity of the caller, or 401.
    pub(crate) async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, ApiError> {
        let token = bearer_token(headers)?;
        let account = self
            .accounts
            .resolve_token(token)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_owned()))?;
        Ok(account.identity())
    }
}
