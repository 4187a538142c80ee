//! Error Types for the Crypto Chatbot

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatbotError>;

#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Failed to load reference data from {}: {source}", path.display())]
    ReferenceData {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{service} API returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Newsletter error: {0}")]
    Newsletter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Agent(#[from] agent_core::AgentError),
}

impl ChatbotError {
    pub fn api(service: &'static str, status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::Api {
            service,
            status: status.as_u16(),
            body: body.into(),
        }
    }

    /// Message safe to show an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) | Self::Newsletter(msg) => msg.clone(),
            Self::Api { service, .. } => format!("The {service} service returned an error."),
            Self::Network(_) => "A data provider could not be reached. Please try again.".into(),
            Self::Agent(e) => e.user_message(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<ChatbotError> for agent_core::AgentError {
    fn from(err: ChatbotError) -> Self {
        match err {
            ChatbotError::Agent(inner) => inner,
            other => Self::ToolExecution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ChatbotError::api("CoinGecko", reqwest::StatusCode::NOT_FOUND, "coin not found");
        assert_eq!(err.to_string(), "CoinGecko API returned 404: coin not found");
        assert_eq!(err.user_message(), "The CoinGecko service returned an error.");
    }

    #[test]
    fn test_agent_error_round_trips() {
        let err: agent_core::AgentError =
            ChatbotError::Agent(agent_core::AgentError::Parse("x".into())).into();
        assert!(matches!(err, agent_core::AgentError::Parse(_)));
    }
}
