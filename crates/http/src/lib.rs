//! HTTP server hosting the venti serverless functions.
//!
//! Every function is a `POST /functions/v1/{name}` that authenticates the
//! bearer token against the local account store.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(unused_results, reason = "Some results are intentionally ignored")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod api_types;
mod auth;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use venti_core::Companion;
use venti_llm::functions::{
    ADMIN_GET_USERS, ADMIN_UPDATE_ROLE, GET_AI_COMMUNITY_CHAT, GET_AI_COMMUNITY_STORY,
    GET_AI_RESPONSE, GET_AI_WEEKLY_SUMMARY, GET_USER_DATA_BUNDLE,
};
use venti_service::{AdminService, SessionBootstrapper};
use venti_storage::{AccountStore, RecordStore};

pub use api_types::HealthResponse;

/// Shared state for all function handlers.
pub struct AppState {
    /// Resolves bearer tokens to identities
    pub accounts: Arc<dyn AccountStore>,
    /// Builds the per-user bundle
    pub bootstrapper: SessionBootstrapper,
    /// Role-checked user administration
    pub admin: AdminService,
    /// Text generation backend; the AI functions answer 503 without one
    pub companion: Option<Arc<dyn Companion>>,
}

impl AppState {
    /// State over one store that holds both records and accounts.
    pub fn new<S>(store: Arc<S>, companion: Option<Arc<dyn Companion>>, timeout: Duration) -> Self
    where
        S: RecordStore + AccountStore + 'static,
    {
        Self {
            accounts: Arc::clone(&store) as Arc<dyn AccountStore>,
            bootstrapper: SessionBootstrapper::new(
                Arc::clone(&store) as Arc<dyn RecordStore>,
                timeout,
            ),
            admin: AdminService::new(
                Arc::clone(&store) as Arc<dyn venti_storage::ProfileStore>,
                store as Arc<dyn AccountStore>,
                timeout,
            ),
            companion,
        }
    }
}

fn function_path(name: &str) -> String {
    format!("/functions/v1/{name}")
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(&function_path(GET_USER_DATA_BUNDLE), post(handlers::bundle::user_data_bundle))
        .route(&function_path(ADMIN_GET_USERS), post(handlers::admin::get_users))
        .route(&function_path(ADMIN_UPDATE_ROLE), post(handlers::admin::update_role))
        .route(&function_path(GET_AI_RESPONSE), post(handlers::ai::ai_response))
        .route(&function_path(GET_AI_WEEKLY_SUMMARY), post(handlers::ai::weekly_summary))
        .route(&function_path(GET_AI_COMMUNITY_CHAT), post(handlers::ai::community_chat))
        .route(&function_path(GET_AI_COMMUNITY_STORY), post(handlers::ai::community_story))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}
