//! Companion text functions. The request shapes match what
//! `FunctionsClient` sends.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use venti_core::{Companion, PersonaMessage};
use venti_llm::functions::{
    AiResponseRequest, CommunityChatRequest, CommunityStoryRequest, TextResponse,
    WeeklySummaryRequest,
};

use crate::AppState;
use crate::api_error::ApiError;

fn companion(state: &AppState) -> Result<&Arc<dyn Companion>, ApiError> {
    state
        .companion
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("AI companion is not configured".to_owned()))
}

pub async fn ai_response(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AiResponseRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    state.authenticate(&headers).await?;
    let text = companion(&state)?.reply(&req.new_message, &req.history, &req.user_data).await?;
    Ok(Json(TextResponse { text }))
}

pub async fn weekly_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<WeeklySummaryRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    state.authenticate(&headers).await?;
    let text = companion(&state)?.weekly_summary(&req.entries, &req.moods).await?;
    Ok(Json(TextResponse { text }))
}

pub async fn community_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CommunityChatRequest>,
) -> Result<Json<Vec<PersonaMessage>>, ApiError> {
    state.authenticate(&headers).await?;
    let replies = companion(&state)?.community_reply(&req.history).await?;
    Ok(Json(replies))
}

pub async fn community_story(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CommunityStoryRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    state.authenticate(&headers).await?;
    if req.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic is required".to_owned()));
    }
    let text = companion(&state)?.community_story(&req.topic).await?;
    Ok(Json(TextResponse { text }))
}
