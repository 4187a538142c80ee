//! CryptoCompare News Client

use async_trait::async_trait;
use serde_json::Value;

use super::{NewsSearch, json_body};
use crate::config::ServiceConfig;
use crate::error::{ChatbotError, Result};
use crate::model::{NewsItem, Votes};

const SERVICE: &str = "CryptoCompare";
const MAX_ITEMS: usize = 10;

pub struct CryptoCompareClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl CryptoCompareClient {
    pub const fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl NewsSearch for CryptoCompareClient {
    async fn latest(&self, category: Option<&str>) -> Result<Vec<NewsItem>> {
        let mut query = vec![("lang", "EN")];
        if let Some(category) = category {
            query.push(("categories", category));
        }
        let mut request = self.http.get(self.config.url("data/v2/news/")).query(&query);
        if let Some(key) = &self.config.api_key {
            request = request.header("authorization", format!("Apikey {key}"));
        }
        let body = json_body(SERVICE, request.send().await?).await?;
        parse_news(&body)
    }
}

/// Items of a `data/v2/news` body. An error envelope (rate limiting is
/// reported in-band) is an API error.
fn parse_news(body: &Value) -> Result<Vec<NewsItem>> {
    if body.get("Response").and_then(Value::as_str) == Some("Error") {
        let message = body.get("Message").and_then(Value::as_str).unwrap_or("unknown error");
        return Err(ChatbotError::api(SERVICE, reqwest::StatusCode::OK, message));
    }
    let items: Vec<&Value> = match body.get("Data") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(items)) => items.values().collect(),
        _ => Vec::new(),
    };
    Ok(items.into_iter().take(MAX_ITEMS).map(news_item).collect())
}

fn news_item(item: &Value) -> NewsItem {
    let text = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    let count = |key: &str| match item.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => 0,
    };
    let source = item
        .pointer("/source_info/name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| item.get("source").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "Unknown".into());
    let title = item.get("title").and_then(Value::as_str).unwrap_or("No title");

    NewsItem {
        id: item.get("id").cloned().unwrap_or(Value::Null),
        title: title.to_string(),
        description: text("body"),
        source,
        url: text("url"),
        imageurl: text("imageurl"),
        published_at: item.get("published_on").cloned().unwrap_or_else(|| Value::from("")),
        tags: text("tags"),
        categories: text("categories")
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        votes: Votes {
            upvotes: count("upvotes"),
            downvotes: count("downvotes"),
        },
        lang: item.get("lang").and_then(Value::as_str).unwrap_or("EN").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_news() {
        let body = json!({"Data": [{
            "id": "123",
            "title": "Bitcoin hits new high",
            "body": "Details",
            "source": "coindesk",
            "source_info": {"name": "CoinDesk"},
            "url": "https://coindesk.com/a",
            "published_on": 1_700_000_000,
            "categories": "BTC|Trading|",
            "upvotes": "3",
            "downvotes": 1
        }]});
        let items = parse_news(&body).unwrap();
        assert_eq!(items[0].source, "CoinDesk");
        assert_eq!(items[0].categories, vec!["BTC", "Trading"]);
        assert_eq!(items[0].votes, Votes { upvotes: 3, downvotes: 1 });
        assert_eq!(items[0].lang, "EN");
    }

    #[test]
    fn test_error_envelope() {
        let body = json!({"Response": "Error", "Message": "rate limit", "Data": []});
        assert!(matches!(parse_news(&body), Err(ChatbotError::Api { .. })));
    }

    #[test]
    fn test_caps_items() {
        let data: Vec<Value> = (0..15).map(|i| json!({"id": i, "title": "t"})).collect();
        assert_eq!(parse_news(&json!({"Data": data})).unwrap().len(), 10);
    }
}
