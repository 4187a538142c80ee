//! Data API Integration
//!
//! One trait per external data source so tools, the news feed and the
//! newsletter can be exercised against [`MockDataApi`].

mod coingecko;
mod cryptocompare;
mod cryptopanic;
mod exchangerate;
mod mock;

pub use coingecko::CoinGeckoClient;
pub use cryptocompare::CryptoCompareClient;
pub use cryptopanic::CryptoPanicClient;
pub use exchangerate::ExchangeRateClient;
pub use mock::MockDataApi;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ChatbotError, Result};
use crate::model::{CoinEntry, NewsArticle, NewsItem, NftEntry};

/// Crypto market data (CoinGecko)
///
/// Methods return the provider's JSON body as-is; shapes are interpreted
/// downstream by the summarizer and the chart dispatcher.
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    /// Global market overview, including `market_cap_percentage`
    async fn global(&self) -> Result<Value>;

    /// `{"<id>": {"<vs>": price}}`
    async fn simple_price(&self, ids: &str, vs_currencies: &str) -> Result<Value>;

    /// Coin details
    async fn coin(&self, id: &str) -> Result<Value>;

    /// Market row for one coin in USD
    async fn coin_markets(&self, id: &str) -> Result<Value>;

    async fn search(&self, query: &str) -> Result<Value>;

    /// `{"prices": [[ms, price]], ...}` between two unix timestamps (seconds)
    async fn market_chart_range(&self, id: &str, vs_currency: &str, from: i64, to: i64) -> Result<Value>;

    /// NFT collection details, including `floor_price`
    async fn nft(&self, id: &str) -> Result<Value>;

    async fn trending(&self) -> Result<Value>;

    /// Full coin reference list
    async fn coins_list(&self) -> Result<Vec<CoinEntry>>;

    /// Full NFT reference list
    async fn nfts_list(&self) -> Result<Vec<NftEntry>>;

    fn name(&self) -> &str;
}

/// Fiat exchange rates (exchangerate.host)
#[async_trait]
pub trait FxRatesApi: Send + Sync {
    /// `{"query": {"from", "to", "amount"}, "result": value, "info": {...}}`
    async fn convert(&self, from: &str, to: &str, amount: f64) -> Result<Value>;

    /// `{"source": "USD", "quotes": {"YYYY-MM-DD": {"USDEUR": rate}}}`
    async fn timeframe(&self, source: &str, currencies: &str, start_date: &str, end_date: &str) -> Result<Value>;

    fn name(&self) -> &str;
}

/// CryptoPanic post filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostFilter {
    #[default]
    Rising,
    Hot,
    Important,
}

impl PostFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Hot => "hot",
            Self::Important => "important",
        }
    }
}

/// Aggregated crypto news posts (CryptoPanic)
#[async_trait]
pub trait TopicNews: Send + Sync {
    /// News posts, optionally restricted to comma-separated currency codes
    async fn posts(&self, filter: PostFilter, currencies: Option<&str>) -> Result<Vec<NewsArticle>>;

    /// Up to `limit` rising posts whose title contains `query`. When fewer
    /// than `limit` match, the unfiltered posts are returned instead.
    async fn search(&self, query: &str, currencies: Option<&str>, limit: usize) -> Result<Vec<NewsArticle>> {
        let mut posts = self.posts(PostFilter::Rising, currencies).await?;
        let needle = query.to_lowercase();
        let matching: Vec<NewsArticle> = posts
            .iter()
            .filter(|post| post.title.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect();
        if matching.len() >= limit {
            return Ok(matching);
        }
        posts.truncate(limit);
        Ok(posts)
    }
}

/// Latest news by category (CryptoCompare)
#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Latest English news, optionally for one category code (e.g. `BTC`)
    async fn latest(&self, category: Option<&str>) -> Result<Vec<NewsItem>>;
}

/// Body of a successful response as JSON; any other status is an API error
/// carrying the response text.
pub(crate) async fn json_body(service: &'static str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(service, status = status.as_u16(), "Data API request failed");
        return Err(ChatbotError::api(service, status, body));
    }
    Ok(response.json().await?)
}
