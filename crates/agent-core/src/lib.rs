//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and a tool system
//! driven by `FUNCTION_CALL:` lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Agent                               │
//! │  ┌──────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ Plan / Parse │  │    Tools    │  │   LlmProvider       │  │
//! │  │   / Execute  │──│   Registry  │──│   (Strategy)        │  │
//! │  └──────────────┘  └─────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Groq, Ollama or any
//! other backend without changing agent logic.

pub mod call;
pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use call::{CallArg, ParsedCall, extract_calls, parse_call};
pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, ExecutedCall, Plan};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
