//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use agent_core::ModelInfo;
use crypto_chat::newsletter::{TopicUpdateMode, update_topics};
use crypto_chat::{ChatReply, ChatbotError, NewsResponse, Subscriber};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_connected: bool,
    pub offline: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
pub struct TrendingResponse {
    pub success: bool,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub search: Option<String>,
}

fn default_user() -> String {
    "User".into()
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default = "default_user", rename = "userName")]
    pub user_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTopicsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default = "default_user", rename = "userName")]
    pub user_name: String,
    #[serde(default)]
    pub mode: TopicUpdateMode,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SubscriberResponse {
    pub success: bool,
    #[serde(flatten)]
    pub subscriber: Subscriber,
}

// ============================================================================
// Error mapping
// ============================================================================

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn bad_request(error: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", error)
}

fn from_chatbot_error(err: &ChatbotError) -> ApiError {
    let (status, code) = match err {
        ChatbotError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        ChatbotError::Api { status: 404, .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ChatbotError::Api { status: 503, .. } => (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE"),
        ChatbotError::Api { .. } | ChatbotError::Network(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
        ChatbotError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
        ChatbotError::Agent(e) if e.is_retryable() => (StatusCode::SERVICE_UNAVAILABLE, "AGENT_ERROR"),
        ChatbotError::Agent(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::warn!(error = %err, "Request rejected");
    }
    api_error(status, code, err.user_message())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        llm_connected,
        offline: state.offline,
    })
}

/// Models offered by the configured provider
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, ApiError> {
    state.provider.list_models().await.map(Json).map_err(|e| {
        tracing::warn!(error = %e, "Model listing failed");
        api_error(StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE", e.user_message())
    })
}

/// One chat turn
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    state
        .pipeline
        .handle(&payload.message)
        .await
        .map(Json)
        .map_err(|e| from_chatbot_error(&e))
}

/// Trending coins, NFTs and categories
pub async fn trending(State(state): State<AppState>) -> Result<Json<TrendingResponse>, ApiError> {
    let data = state
        .services
        .market
        .trending()
        .await
        .map_err(|e| from_chatbot_error(&e))?;
    Ok(Json(TrendingResponse { success: true, data }))
}

/// Latest news, optionally about one coin
pub async fn news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsResponse>, ApiError> {
    state
        .news
        .latest(query.search.as_deref())
        .await
        .map(Json)
        .map_err(|e| from_chatbot_error(&e))
}

pub async fn newsletter_subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(bad_request("Email is required"));
    }
    if payload.topics.is_empty() {
        return Err(bad_request("At least one topic must be selected"));
    }
    tracing::info!(email, topics = ?payload.topics, "Newsletter subscription");

    let outcome = state
        .services
        .subscribers
        .subscribe(email, crypto_chat::newsletter::first_name(&payload.user_name), &payload.topics)
        .await
        .map_err(|e| from_chatbot_error(&e))?;
    Ok(Json(SubscriptionResponse {
        success: true,
        message: outcome.message().into(),
        email: Some(email.to_string()),
        topics: Some(payload.topics),
    }))
}

pub async fn newsletter_unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(bad_request("Email is required"));
    }
    state
        .services
        .subscribers
        .unsubscribe(email)
        .await
        .map_err(|e| from_chatbot_error(&e))?;
    Ok(Json(SubscriptionResponse {
        success: true,
        message: "Successfully unsubscribed from newsletter".into(),
        email: None,
        topics: None,
    }))
}

pub async fn newsletter_topics(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<SubscriberResponse>, ApiError> {
    let subscriber = state
        .services
        .subscribers
        .lookup(&email)
        .await
        .map_err(|e| from_chatbot_error(&e))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Subscriber not found"))?;
    Ok(Json(SubscriberResponse {
        success: true,
        subscriber,
    }))
}

pub async fn newsletter_update_topics(
    State(state): State<AppState>,
    Json(payload): Json<UpdateTopicsRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(bad_request("Email is required"));
    }
    if payload.topics.is_empty() {
        return Err(bad_request("At least one topic must be provided"));
    }
    let topics = update_topics(
        state.services.subscribers.as_ref(),
        email,
        &payload.user_name,
        payload.topics,
        payload.mode,
    )
    .await
    .map_err(|e| from_chatbot_error(&e))?;
    Ok(Json(SubscriptionResponse {
        success: true,
        message: "Topics updated successfully".into(),
        email: Some(email.to_string()),
        topics: Some(topics),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agent_core::{
        AgentError, Completion, GenerationOptions, LlmProvider, Message, ProviderInfo, Result as CoreResult,
    };
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use crypto_chat::{ChatbotConfig, CoinEntry, NftEntry, ReferenceData, Services};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::router;

    /// Answers every prompt with the same text
    struct EchoProvider(&'static str);

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn info(&self) -> CoreResult<ProviderInfo> {
            Ok(ProviderInfo {
                name: "echo".into(),
                version: None,
                default_model: "echo".into(),
                models: Vec::new(),
            })
        }

        async fn health_check(&self) -> CoreResult<bool> {
            Ok(true)
        }

        async fn complete(&self, _: &[Message], _: &GenerationOptions) -> CoreResult<Completion> {
            Ok(Completion {
                content: self.0.into(),
                model: "echo".into(),
                usage: None,
                truncated: false,
                finish_reason: None,
            })
        }

        async fn list_models(&self) -> CoreResult<Vec<ModelInfo>> {
            Err(AgentError::ProviderUnavailable("no models".into()))
        }
    }

    fn app() -> axum::Router {
        let reference = ReferenceData::from_entries(
            vec![CoinEntry::new("bitcoin", "btc", "Bitcoin")],
            vec![NftEntry::new("cryptopunks", "CryptoPunks", Some("PUNK"))],
        );
        let config = ChatbotConfig {
            offline: true,
            ..ChatbotConfig::default()
        };
        let services = Services::offline(&config, Arc::new(reference));
        let state = AppState::new(Arc::new(EchoProvider("Hello there!")), services, true).unwrap();
        router(state)
    }

    async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["llm_connected"], true);
        assert_eq!(body["offline"], true);
    }

    #[tokio::test]
    async fn test_chat_direct_reply() {
        let (status, body) = call(&app(), "POST", "/chat", Some(json!({"message": "hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "Hello there!", "charts": null}));
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let (status, body) = call(&app(), "POST", "/chat", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No message provided");
    }

    #[tokio::test]
    async fn test_models_unavailable() {
        let (status, body) = call(&app(), "GET", "/api/models", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "PROVIDER_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_trending_and_news() {
        let app = app();
        let (status, body) = call(&app, "GET", "/trending", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["coins"].is_array());

        let (status, body) = call(&app, "GET", "/news?search=bitcoin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "cryptocompare");
        assert_eq!(body["search_query"], "bitcoin");
    }

    #[tokio::test]
    async fn test_newsletter_lifecycle() {
        let app = app();
        let subscribe = json!({"email": "ada@example.com", "topics": ["bitcoin"], "userName": "Ada Lovelace"});
        let (status, body) = call(&app, "POST", "/api/newsletter/subscribe", Some(subscribe)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully subscribed to newsletter");

        let update = json!({"email": "ada@example.com", "topics": ["defi"], "userName": "Ada", "mode": "merge"});
        let (_, body) = call(&app, "POST", "/api/newsletter/topics/update", Some(update)).await;
        assert_eq!(body["topics"], json!(["bitcoin", "defi"]));

        let (status, body) = call(&app, "GET", "/api/newsletter/topics/ada@example.com", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["topics"], json!(["bitcoin", "defi"]));

        let unsubscribe = json!({"email": "ada@example.com"});
        let (status, _) = call(&app, "POST", "/api/newsletter/unsubscribe", Some(unsubscribe)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", "/api/newsletter/topics/ada@example.com", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Subscriber not found");
    }

    #[tokio::test]
    async fn test_subscribe_validation() {
        let app = app();
        let (status, body) =
            call(&app, "POST", "/api/newsletter/subscribe", Some(json!({"email": "a@example.com"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least one topic must be selected");

        let (status, body) = call(&app, "POST", "/api/newsletter/unsubscribe", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email is required");
    }
}
