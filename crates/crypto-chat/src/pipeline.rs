//! Chat Pipeline
//!
//! One user turn: plan → execute calls → decide on charts → build charts →
//! phrase the answer. Charts are built from full tool results, the LLM only
//! ever sees the summaries.

use agent_core::{Agent, GenerationOptions, Plan};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chart::{ChartSpec, VisualizationDecision, plan_charts};
use crate::error::{ChatbotError, Result};
use crate::prompts::{answer_prompt, planning_prompt, visualization_prompt};
use crate::summarize::{render_for_prompt, summarize};

/// Reply to one chat message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// `null` when nothing was charted
    pub charts: Option<Vec<ChartSpec>>,
}

impl ChatReply {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            charts: None,
        }
    }
}

/// Orchestrates a chat turn over an [`Agent`]
pub struct ChatPipeline {
    agent: Agent,
}

impl ChatPipeline {
    pub const fn new(agent: Agent) -> Self {
        Self { agent }
    }

    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    pub async fn handle(&self, message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatbotError::InvalidInput("No message provided".into()));
        }

        let functions = self.agent.tools().generate_prompt_section();
        let prompt = planning_prompt(message, Utc::now().date_naive(), &functions);
        let calls = match self.agent.plan(&prompt).await? {
            Plan::Direct(text) => return Ok(ChatReply::text(text)),
            Plan::Calls(calls) => calls,
        };

        tracing::info!(calls = calls.len(), "Executing function calls");
        let results: Vec<Value> = self
            .agent
            .execute(&calls)
            .await
            .iter()
            .map(|executed| executed.result.payload())
            .collect();

        let summaries: Vec<Value> = results.iter().map(summarize).collect();
        let data = render_for_prompt(&summaries);

        let decision = self.decide_visualization(&data).await;
        let charts = plan_charts(&results, decision);
        tracing::debug!(?decision, charts = charts.len(), "Visualization");

        let answer = self
            .agent
            .prompt(&answer_prompt(message, &data), &GenerationOptions::answer())
            .await?;

        Ok(ChatReply {
            response: answer.trim().to_string(),
            charts: (!charts.is_empty()).then_some(charts),
        })
    }

    /// A failed decision call means no charts, not a failed turn.
    async fn decide_visualization(&self, data: &str) -> VisualizationDecision {
        match self
            .agent
            .prompt(&visualization_prompt(data), &GenerationOptions::decision())
            .await
        {
            Ok(text) => VisualizationDecision::parse(&text),
            Err(e) => {
                tracing::warn!(error = %e, "Visualization check failed");
                VisualizationDecision::No
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use agent_core::{
        AgentBuilder, AgentError, Completion, LlmProvider, Message, ModelInfo, ProviderInfo,
        Result as CoreResult,
    };
    use async_trait::async_trait;

    use super::*;
    use crate::chart::ChartType;
    use crate::svckit::{build_registry, fixtures::sources};

    /// Replies in order; `None` fails that call
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Option<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[Option<&str>]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.map(str::to_string)).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> CoreResult<ProviderInfo> {
            Ok(ProviderInfo {
                name: "scripted".into(),
                version: None,
                default_model: "test".into(),
                models: Vec::new(),
            })
        }

        async fn health_check(&self) -> CoreResult<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], _: &GenerationOptions) -> CoreResult<Completion> {
            self.prompts.lock().unwrap().push(messages[0].content.clone());
            let reply = self.replies.lock().unwrap().pop_front().flatten();
            let content = reply.ok_or_else(|| AgentError::ProviderUnavailable("scripted failure".into()))?;
            Ok(Completion {
                content,
                model: "test".into(),
                usage: None,
                truncated: false,
                finish_reason: None,
            })
        }

        async fn list_models(&self) -> CoreResult<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    fn pipeline(provider: Arc<ScriptedProvider>) -> ChatPipeline {
        let agent = AgentBuilder::new()
            .provider(provider)
            .tools(build_registry(&sources()).unwrap())
            .build()
            .unwrap();
        ChatPipeline::new(agent)
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let provider = ScriptedProvider::new(&[]);
        let err = pipeline(provider).handle("   ").await.unwrap_err();
        assert!(matches!(err, ChatbotError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = ScriptedProvider::new(&[Some("Hey! Ask me about crypto.")]);
        let reply = pipeline(provider.clone()).handle("hi").await.unwrap();
        assert_eq!(reply, ChatReply::text("Hey! Ask me about crypto."));
        assert!(provider.prompt(0).contains("get_coin_price(vs_currency=\"inr\", coin_id=\"bitcoin\")"));
    }

    #[tokio::test]
    async fn test_comparison_turn() {
        let provider = ScriptedProvider::new(&[
            Some("FUNCTION_CALL: get_coin_price(\"usd\", \"bitcoin\")\nFUNCTION_CALL: get_coin_price(\"usd\", \"eth\")"),
            Some("GRAPH: YES - COMPARISON"),
            Some("  Here's what I found:\n• Bitcoin: $97,500\n• Ethereum: $3,450  "),
        ]);
        let reply = pipeline(provider.clone()).handle("Compare BTC and ETH").await.unwrap();
        assert!(reply.response.starts_with("Here's what I found"));
        let charts = reply.charts.unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].data.labels, vec!["Bitcoin", "Ethereum"]);
        assert!(provider.prompt(2).contains("\"ethereum\""));
    }

    #[tokio::test]
    async fn test_visualization_failure_means_no_charts() {
        let provider = ScriptedProvider::new(&[
            Some("FUNCTION_CALL: get_exchange_rate(\"USD\", \"EUR\")"),
            None,
            Some("That's €0.92 per dollar"),
        ]);
        let reply = pipeline(provider).handle("usd to eur").await.unwrap();
        assert_eq!(reply.response, "That's €0.92 per dollar");
        assert!(reply.charts.is_none());
    }

    #[tokio::test]
    async fn test_summaries_reach_the_answer_prompt() {
        let provider = ScriptedProvider::new(&[
            Some("FUNCTION_CALL: get_crypto_historical_data(\"2024-01-01\", \"2024-01-20\", \"bitcoin\", \"usd\")"),
            Some("GRAPH: YES - TIME_SERIES"),
            Some("Bitcoin moved a little."),
        ]);
        let reply = pipeline(provider.clone()).handle("btc last 20 days").await.unwrap();
        let charts = reply.charts.unwrap();
        assert_eq!(charts[0].chart_type, ChartType::Line);
        assert_eq!(charts[0].data.labels.len(), 20);
        let answer_prompt = provider.prompt(2);
        assert!(answer_prompt.contains("crypto_historical_data"));
        assert!(!answer_prompt.contains("\"prices\""));
    }

    #[tokio::test]
    async fn test_rejected_call_becomes_error_result() {
        let provider = ScriptedProvider::new(&[
            Some("FUNCTION_CALL: get_coin_price(__import__('os').system('ls'))"),
            Some("GRAPH: NO"),
            Some("Sorry, that lookup failed."),
        ]);
        let reply = pipeline(provider.clone()).handle("price?").await.unwrap();
        assert!(reply.charts.is_none());
        assert!(provider.prompt(2).contains("\"error\""));
    }

    #[tokio::test]
    async fn test_planning_failure_is_error() {
        let provider = ScriptedProvider::new(&[None]);
        let err = pipeline(provider).handle("hello").await.unwrap_err();
        assert!(matches!(err, ChatbotError::Agent(AgentError::ProviderUnavailable(_))));
    }
}
