//! CryptoPanic Client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{PostFilter, TopicNews, json_body};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::model::{NewsArticle, NewsSource};

const SERVICE: &str = "CryptoPanic";

#[derive(Deserialize)]
struct PostsPage {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Deserialize)]
struct Post {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_at: String,
    source: Option<PostSource>,
}

#[derive(Deserialize)]
struct PostSource {
    #[serde(default)]
    title: String,
    #[serde(default)]
    domain: String,
}

impl From<Post> for NewsArticle {
    fn from(post: Post) -> Self {
        let id = match post.id {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        // Posts without an outbound link point at their CryptoPanic page
        let url = if post.url.is_empty() && !id.is_empty() {
            format!("https://cryptopanic.com/news/{id}")
        } else {
            post.url
        };
        let source = post.source.map_or_else(
            || NewsSource {
                title: SERVICE.into(),
                domain: String::new(),
            },
            |s| NewsSource {
                title: s.title,
                domain: s.domain,
            },
        );
        Self {
            id,
            title: post.title,
            url,
            published_at: post.published_at,
            source,
        }
    }
}

pub struct CryptoPanicClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl CryptoPanicClient {
    pub const fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl TopicNews for CryptoPanicClient {
    async fn posts(&self, filter: PostFilter, currencies: Option<&str>) -> Result<Vec<NewsArticle>> {
        let mut query = vec![("kind", "news"), ("filter", filter.as_str())];
        if let Some(key) = self.config.api_key.as_deref() {
            query.push(("auth_token", key));
        }
        if let Some(currencies) = currencies {
            query.push(("currencies", currencies));
        }
        let response = self.http.get(self.config.url("posts/")).query(&query).send().await?;
        let page: PostsPage = serde_json::from_value(json_body(SERVICE, response).await?)?;
        tracing::debug!(filter = filter.as_str(), posts = page.results.len(), "CryptoPanic posts");
        Ok(page.results.into_iter().map(NewsArticle::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_conversion() {
        let page: PostsPage = serde_json::from_str(
            r#"{"results": [
                {"id": 42, "title": "BTC up", "url": "", "published_at": "2024-01-01T00:00:00Z"},
                {"id": "7", "title": "ETH", "url": "https://x.io/a", "source": {"title": "X", "domain": "x.io"}}
            ]}"#,
        )
        .unwrap();
        let articles: Vec<NewsArticle> = page.results.into_iter().map(NewsArticle::from).collect();
        assert_eq!(articles[0].id, "42");
        assert_eq!(articles[0].url, "https://cryptopanic.com/news/42");
        assert_eq!(articles[0].source.title, "CryptoPanic");
        assert_eq!(articles[1].url, "https://x.io/a");
        assert_eq!(articles[1].source.domain, "x.io");
    }
}
