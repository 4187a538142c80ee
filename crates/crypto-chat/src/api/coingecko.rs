//! CoinGecko Client

use async_trait::async_trait;
use serde_json::Value;

use super::{MarketDataApi, json_body};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::model::{CoinEntry, NftEntry};

const SERVICE: &str = "CoinGecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const NFT_PAGE_SIZE: usize = 250;
const MAX_NFT_PAGES: usize = 40;

/// CoinGecko v3 REST client
pub struct CoinGeckoClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl CoinGeckoClient {
    pub const fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let mut request = self.http.get(self.config.url(path)).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        tracing::debug!(path, "CoinGecko request");
        json_body(SERVICE, request.send().await?).await
    }
}

#[async_trait]
impl MarketDataApi for CoinGeckoClient {
    async fn global(&self) -> Result<Value> {
        self.get("global", &[]).await
    }

    async fn simple_price(&self, ids: &str, vs_currencies: &str) -> Result<Value> {
        self.get("simple/price", &[("vs_currencies", vs_currencies), ("ids", ids)])
            .await
    }

    async fn coin(&self, id: &str) -> Result<Value> {
        self.get(
            &format!("coins/{id}"),
            &[
                ("localization", "false"),
                ("tickers", "false"),
                ("community_data", "true"),
                ("developer_data", "false"),
            ],
        )
        .await
    }

    async fn coin_markets(&self, id: &str) -> Result<Value> {
        self.get(
            "coins/markets",
            &[
                ("vs_currency", "usd"),
                ("ids", id),
                ("order", "market_cap_desc"),
                ("per_page", "1"),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h,7d,30d"),
            ],
        )
        .await
    }

    async fn search(&self, query: &str) -> Result<Value> {
        self.get("search", &[("query", query)]).await
    }

    async fn market_chart_range(&self, id: &str, vs_currency: &str, from: i64, to: i64) -> Result<Value> {
        let (from, to) = (from.to_string(), to.to_string());
        self.get(
            &format!("coins/{id}/market_chart/range"),
            &[("vs_currency", vs_currency), ("from", &from), ("to", &to)],
        )
        .await
    }

    async fn nft(&self, id: &str) -> Result<Value> {
        self.get(&format!("nfts/{id}"), &[]).await
    }

    async fn trending(&self) -> Result<Value> {
        self.get("search/trending", &[]).await
    }

    async fn coins_list(&self) -> Result<Vec<CoinEntry>> {
        Ok(serde_json::from_value(self.get("coins/list", &[]).await?)?)
    }

    async fn nfts_list(&self) -> Result<Vec<NftEntry>> {
        let per_page = NFT_PAGE_SIZE.to_string();
        let mut all = Vec::new();
        for page in 1..=MAX_NFT_PAGES {
            let page = page.to_string();
            let body = self
                .get("nfts/list", &[("per_page", &per_page), ("page", &page)])
                .await?;
            let batch: Vec<NftEntry> = serde_json::from_value(body)?;
            let last = batch.len() < NFT_PAGE_SIZE;
            all.extend(batch);
            if last {
                break;
            }
        }
        Ok(all)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}
