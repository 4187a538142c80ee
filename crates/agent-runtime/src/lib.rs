//! # agent-runtime
//!
//! Runtime providers for the chatbot agent.
//!
//! ## Providers
//!
//! - **Groq** (default): hosted inference over the OpenAI-compatible API
//! - **Ollama**: local LLM inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::provider_from_env;
//!
//! let provider = provider_from_env()?;
//! let agent = AgentBuilder::new().provider(provider).build()?;
//! ```

use std::sync::Arc;

#[cfg(feature = "groq")]
pub mod groq;
#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "groq")]
pub use groq::{GroqConfig, GroqProvider};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{Agent, AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry};

/// Build the provider named by `LLM_PROVIDER` (`groq` unless set).
pub fn provider_from_env() -> Result<Arc<dyn LlmProvider>> {
    let kind = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "groq".into());
    provider_named(&kind)
}

/// Build a provider by name, configured from the environment.
pub fn provider_named(kind: &str) -> Result<Arc<dyn LlmProvider>> {
    match kind.trim().to_ascii_lowercase().as_str() {
        #[cfg(feature = "groq")]
        "groq" => {
            let provider = GroqProvider::from_env()?;
            tracing::info!("Using Groq provider");
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "ollama")]
        "ollama" => {
            tracing::info!("Using Ollama provider");
            Ok(Arc::new(OllamaProvider::from_env()))
        }
        other => Err(AgentError::Config(format!(
            "Unknown or disabled LLM provider: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_config_error() {
        assert!(matches!(
            provider_named("gpt-nonexistent"),
            Err(AgentError::Config(_))
        ));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn test_ollama_needs_no_key() {
        assert!(provider_named("Ollama").is_ok());
    }
}
