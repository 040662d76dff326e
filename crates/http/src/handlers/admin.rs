use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use venti_core::Role;
use venti_llm::functions::{SuccessResponse, UsersResponse};

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::RawRoleChange;

pub async fn get_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UsersResponse>, ApiError> {
    let caller = state.authenticate(&headers).await?;
    let users = state.admin.list_users(&caller).await?;
    Ok(Json(UsersResponse { users }))
}

/// Role is validated before the caller, so a bad role is always a 400.
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let req: RawRoleChange = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;
    if !req.new_role.parse::<Role>().is_ok_and(Role::is_assignable) {
        return Err(ApiError::BadRequest("Invalid role specified".to_owned()));
    }
    if req.target_user_id.is_empty() {
        return Err(ApiError::BadRequest("targetUserId is required".to_owned()));
    }
    let caller = state.authenticate(&headers).await?;
    state.admin.update_role(&caller, &req.target_user_id, &req.new_role).await?;
    Ok(Json(SuccessResponse { success: true }))
}
