use std::sync::Arc;

use clap::Parser;
use ring_ai::ChatCompletionsClient;
use ring_server::config::LEGACY_API_KEY_VAR;
use ring_server::{AppState, Config, app};
use ring_store::InMemoryConceptStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let legacy_key = std::env::var(LEGACY_API_KEY_VAR).ok();
    let provider = config.provider(legacy_key.as_deref());
    if provider.api_key.is_none() {
        tracing::warn!("no provider API key configured; design generation will fail");
    }
    tracing::info!(model = %provider.model, api_base = %provider.api_base, "text generation provider");

    let state = AppState::new(
        Arc::new(InMemoryConceptStore::new()),
        Arc::new(ChatCompletionsClient::new(provider)),
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "ring-server listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
