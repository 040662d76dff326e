use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use venti_core::UserData;

use crate::AppState;
use crate::api_error::ApiError;

/// Caller's profile (created on first use) with all four collections.
pub async fn user_data_bundle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserData>, ApiError> {
    let identity = state.authenticate(&headers).await?;
    let data = state.bootstrapper.establish_session(&identity).await?;
    Ok(Json(data))
}
