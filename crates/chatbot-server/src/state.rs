//! Application State

use std::sync::Arc;

use agent_core::{AgentBuilder, LlmProvider};
use crypto_chat::{ChatPipeline, NewsFeed, Services, build_registry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (Groq, Ollama)
    pub provider: Arc<dyn LlmProvider>,

    /// Chat turn orchestration over the tool registry
    pub pipeline: Arc<ChatPipeline>,

    /// Data sources and newsletter backends
    pub services: Services,

    pub news: NewsFeed,

    pub offline: bool,
}

impl AppState {
    pub fn new(provider: Arc<dyn LlmProvider>, services: Services, offline: bool) -> agent_core::Result<Self> {
        let tools = build_registry(&services.data_sources())?;
        tracing::info!("Registered {} tools", tools.len());
        let agent = AgentBuilder::new().provider(provider.clone()).tools(tools).build()?;
        Ok(Self {
            provider,
            pipeline: Arc::new(ChatPipeline::new(agent)),
            news: services.news_feed(),
            services,
            offline,
        })
    }
}
