use std::sync::Arc;

use anyhow::Result;
use venti_core::Companion;
use venti_http::{AppState, create_router};
use venti_service::{LlmSettings, ServiceConfig};

use crate::open_storage;

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let config = ServiceConfig::from_env();
    let storage = open_storage()?;

    let companion: Option<Arc<dyn Companion>> = match LlmSettings::from_env() {
        Some(settings) => {
            tracing::info!(model = %settings.model, "AI companion enabled");
            Some(Arc::new(settings.client(config.request_timeout)?))
        },
        None => {
            tracing::warn!("VENTI_LLM_API_KEY not set, AI functions will answer 503");
            None
        },
    };

    let state = Arc::new(AppState::new(storage, companion, config.request_timeout));
    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
