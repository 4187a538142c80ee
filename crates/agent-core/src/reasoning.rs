//! Plan / Act
//!
//! One user turn is split in two steps. `plan` asks the model which
//! functions to call (or lets it answer directly); `execute` runs the
//! returned call lines through the tool registry. Every failure inside
//! `execute` becomes an `{"error": ...}` result so a bad call never aborts
//! the rest of the turn.

use std::sync::Arc;

use crate::call::{extract_calls, parse_call};
use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Generation options for the planning call
    pub generation: GenerationOptions,

    /// Upper bound on call lines executed per turn
    pub max_calls: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::planning(),
            max_calls: 10,
        }
    }
}

/// What the model decided to do with a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// No function calls; the text is the answer
    Direct(String),
    /// Raw call expressions, in the order the model wrote them
    Calls(Vec<String>),
}

/// A call line together with its outcome
#[derive(Clone, Debug)]
pub struct ExecutedCall {
    /// The expression as the model wrote it
    pub source: String,
    /// The bound call, when parsing and binding succeeded
    pub call: Option<ToolCall>,
    pub result: ToolResult,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Send a single user prompt and return the completion text.
    pub async fn prompt(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let mut options = options.clone();
        if options.model.is_empty() {
            options.model.clone_from(&self.config.generation.model);
        }
        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &options)
            .await?;
        Ok(completion.content)
    }

    /// Ask the model to plan the turn from a fully rendered planning prompt.
    pub async fn plan(&self, planning_prompt: &str) -> Result<Plan> {
        let reply = self.prompt(planning_prompt, &self.config.generation).await?;
        let mut calls = extract_calls(&reply);

        if calls.is_empty() {
            tracing::debug!("Model answered directly");
            return Ok(Plan::Direct(reply.trim().to_string()));
        }

        if calls.len() > self.config.max_calls {
            tracing::warn!(
                requested = calls.len(),
                max = self.config.max_calls,
                "Truncating function calls"
            );
            calls.truncate(self.config.max_calls);
        }
        Ok(Plan::Calls(calls))
    }

    /// Execute call lines sequentially.
    pub async fn execute(&self, calls: &[String]) -> Vec<ExecutedCall> {
        let mut executed = Vec::with_capacity(calls.len());
        for source in calls {
            executed.push(self.execute_one(source).await);
        }
        executed
    }

    async fn execute_one(&self, source: &str) -> ExecutedCall {
        let bound = parse_call(source).and_then(|parsed| self.tools.bind(&parsed));
        let call = match bound {
            Ok(call) => call,
            Err(e) => {
                tracing::warn!(call = %source, error = %e, "Rejected function call");
                return ExecutedCall {
                    source: source.to_string(),
                    call: None,
                    result: ToolResult::error_payload(call_name(source), e.to_string()),
                };
            }
        };

        tracing::debug!(tool = %call.name, "Executing tool");
        let result = match self.tools.execute(&call).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                let mut result = ToolResult::error_payload(&call.name, e.to_string());
                result.id.clone_from(&call.id);
                result
            }
        };

        ExecutedCall {
            source: source.to_string(),
            call: Some(call),
            result,
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get the provider
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

fn call_name(source: &str) -> &str {
    source.split('(').next().unwrap_or(source).trim()
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_calls(mut self, max: usize) -> Self {
        self.config.max_calls = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
