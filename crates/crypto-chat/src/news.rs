//! News Feed
//!
//! Backs `GET /news`. CryptoCompare is tried first; when it errors or has
//! nothing, CryptoPanic rising posts are used, filtered by title.

use std::sync::Arc;

use serde::Serialize;

use crate::api::{NewsSearch, PostFilter, TopicNews};
use crate::error::{ChatbotError, Result};
use crate::model::{NewsArticle, NewsItem, Votes};
use crate::reference::ReferenceData;

const FALLBACK_LIMIT: usize = 10;

/// Which provider answered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsProvider {
    CryptoCompare,
    CryptoPanic,
}

/// Body of a `/news` response
#[derive(Clone, Debug, Serialize)]
pub struct NewsResponse {
    pub success: bool,
    pub source: NewsProvider,
    pub search_query: Option<String>,
    pub count: usize,
    pub news: Vec<NewsItem>,
}

impl NewsResponse {
    fn new(source: NewsProvider, search_query: Option<&str>, news: Vec<NewsItem>) -> Self {
        Self {
            success: true,
            source,
            search_query: search_query.map(str::to_string),
            count: news.len(),
            news,
        }
    }
}

/// Latest news with provider fallback
#[derive(Clone)]
pub struct NewsFeed {
    search: Arc<dyn NewsSearch>,
    posts: Arc<dyn TopicNews>,
    data: Arc<ReferenceData>,
}

impl NewsFeed {
    pub fn new(search: Arc<dyn NewsSearch>, posts: Arc<dyn TopicNews>, data: Arc<ReferenceData>) -> Self {
        Self { search, posts, data }
    }

    /// Latest news, optionally about one coin (id, name or ticker).
    pub async fn latest(&self, query: Option<&str>) -> Result<NewsResponse> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let category = query.map(|q| self.data.symbol_for(q));

        match self.search.latest(category.as_deref()).await {
            Ok(items) if !items.is_empty() => {
                return Ok(NewsResponse::new(NewsProvider::CryptoCompare, query, items));
            }
            Ok(_) => tracing::warn!(?category, "CryptoCompare returned no news, falling back"),
            Err(e) => tracing::warn!(error = %e, "CryptoCompare failed, falling back"),
        }

        let posts = self.posts.posts(PostFilter::Rising, None).await?;
        if posts.is_empty() {
            return Err(ChatbotError::Api {
                service: "CryptoPanic",
                status: 503,
                body: "Unable to fetch news at this time".into(),
            });
        }

        let news: Vec<NewsItem> = match query {
            Some(q) => {
                let needle = q.to_lowercase();
                posts
                    .into_iter()
                    .filter(|post| post.title.to_lowercase().contains(&needle))
                    .take(FALLBACK_LIMIT)
                    .map(news_item)
                    .collect()
            }
            None => posts.into_iter().map(news_item).collect(),
        };
        Ok(NewsResponse::new(NewsProvider::CryptoPanic, query, news))
    }
}

fn news_item(post: NewsArticle) -> NewsItem {
    NewsItem {
        id: post.id.into(),
        title: post.title,
        description: String::new(),
        source: post.source.title,
        url: post.url,
        imageurl: String::new(),
        published_at: post.published_at.into(),
        tags: String::new(),
        categories: Vec::new(),
        votes: Votes::default(),
        lang: "EN".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataApi;
    use crate::reference::fixtures::reference;

    fn feed(api: MockDataApi) -> NewsFeed {
        let api = Arc::new(api);
        NewsFeed::new(api.clone(), api, Arc::new(reference()))
    }

    #[tokio::test]
    async fn test_category_from_coin_name() {
        let response = feed(MockDataApi::new()).latest(Some("Ethereum")).await.unwrap();
        assert_eq!(response.source, NewsProvider::CryptoCompare);
        assert_eq!(response.search_query.as_deref(), Some("Ethereum"));
        assert_eq!(response.count, 3);
        assert!(response.news.iter().all(|n| n.categories == vec!["ETH"]));
    }

    #[tokio::test]
    async fn test_unfiltered_when_no_query() {
        let response = feed(MockDataApi::new()).latest(Some("  ")).await.unwrap();
        assert_eq!(response.search_query, None);
        assert_eq!(response.count, 6);
    }

    #[tokio::test]
    async fn test_falls_back_to_cryptopanic() {
        let response = feed(MockDataApi::new().without_news_search())
            .latest(Some("bitcoin"))
            .await
            .unwrap();
        assert_eq!(response.source, NewsProvider::CryptoPanic);
        assert_eq!(response.count, 2);
        assert!(response.news.iter().all(|n| n.title.to_lowercase().contains("bitcoin")));
        assert_eq!(response.news[0].source, "Example News");
    }

    #[tokio::test]
    async fn test_fallback_filter_is_strict() {
        let response = feed(MockDataApi::new().without_news_search())
            .latest(Some("metaverse"))
            .await
            .unwrap();
        assert_eq!(response.count, 0);
        assert!(response.success);
    }

    #[test]
    fn test_provider_serializes_lowercase() {
        assert_eq!(serde_json::to_value(NewsProvider::CryptoPanic).unwrap(), "cryptopanic");
    }
}
