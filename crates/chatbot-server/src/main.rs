//! Crypto Chatbot HTTP Server
//!
//! Axum server exposing the chat pipeline, market/news lookups and
//! newsletter subscription management.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_chat::{ChatbotConfig, ReferenceData, Services};

use crate::handlers::{
    chat_handler, health_check, list_models, news, newsletter_subscribe, newsletter_topics, newsletter_unsubscribe,
    newsletter_update_topics, trending,
};
use crate::state::AppState;

/// All routes over the shared state
fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        // Chat
        .route("/chat", post(chat_handler))
        // Market & news
        .route("/trending", get(trending))
        .route("/news", get(news))
        // Newsletter
        .route("/api/newsletter/subscribe", post(newsletter_subscribe))
        .route("/api/newsletter/unsubscribe", post(newsletter_unsubscribe))
        .route("/api/newsletter/topics/update", post(newsletter_update_topics))
        .route("/api/newsletter/topics/{email}", get(newsletter_topics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ChatbotConfig::from_env();

    let reference = Arc::new(ReferenceData::load(&config.coins_file, &config.nfts_file)?);
    let services = Services::from_config(&config, reference)?;

    // Initialize LLM provider
    let provider = agent_runtime::provider_from_env()?;
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ LLM provider reachable"),
        Ok(false) | Err(_) => tracing::warn!("⚠ LLM provider not reachable - chat requests will fail"),
    }

    let state = AppState::new(provider, services, config.offline)?;
    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 crypto chatbot running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                          - Health check");
    tracing::info!("  GET  /api/models                      - List available models");
    tracing::info!("  POST /chat                            - Send message");
    tracing::info!("  GET  /trending                        - Trending coins and NFTs");
    tracing::info!("  GET  /news?search=                    - Latest crypto news");
    tracing::info!("  POST /api/newsletter/subscribe        - Subscribe");
    tracing::info!("  POST /api/newsletter/unsubscribe      - Unsubscribe");
    tracing::info!("  GET  /api/newsletter/topics/{{email}}   - Subscriber topics");
    tracing::info!("  POST /api/newsletter/topics/update    - Change topics");

    axum::serve(listener, app).await?;

    Ok(())
}
