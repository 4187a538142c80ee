//! # crypto-chat
//!
//! Chatbot backend for cryptocurrency prices, NFT collections and fiat
//! exchange rates.
//!
//! ## One chat turn
//!
//! ```text
//! ┌────────────┐   FUNCTION_CALL:   ┌────────────┐   raw JSON   ┌──────────────┐
//! │  planning  │ ─────────────────▶ │   svckit   │ ───────────▶ │ chart        │
//! │  (LLM)     │                    │   tools    │              │ dispatcher   │
//! └────────────┘                    └─────┬──────┘              └──────────────┘
//!                                         │ summaries
//!                                         ▼
//!                              ┌────────────────────┐
//!                              │ visualization +    │
//!                              │ answer (LLM)       │
//!                              └────────────────────┘
//! ```
//!
//! Identifiers in tool arguments go through the [`CategoryResolver`], which
//! decides between a coin and an NFT collection using the reference lists.
//! The weekly [`newsletter`] reuses the same data sources.

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod news;
pub mod newsletter;
pub mod pipeline;
pub mod prompts;
pub mod reference;
pub mod resolver;
pub mod services;
pub mod summarize;
pub mod svckit;

pub use chart::{ChartSpec, ChartType, dispatch};
pub use config::{ChatbotConfig, NewsletterConfig, ServiceConfig};
pub use error::{ChatbotError, Result};
pub use model::{Category, CoinEntry, NftEntry, ResolvedIdentifier, Subscriber};
pub use news::{NewsFeed, NewsResponse};
pub use pipeline::{ChatPipeline, ChatReply};
pub use reference::ReferenceData;
pub use resolver::CategoryResolver;
pub use services::Services;
pub use svckit::{DataSources, build_registry};
