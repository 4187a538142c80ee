//! Cryptocurrency market tools (CoinGecko)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use agent_core::{AgentError, ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{DataSources, data_result};
use crate::api::MarketDataApi;

const CATEGORY: &str = "market_data";

fn coin_param(description: &str) -> ParameterSchema {
    ParameterSchema::string("coin_id", description).with_default("bitcoin")
}

/// Global market overview
pub struct GlobalMarketTool {
    market: Arc<dyn MarketDataApi>,
}

impl GlobalMarketTool {
    pub fn new(market: Arc<dyn MarketDataApi>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for GlobalMarketTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_crypto_global_market_data".into(),
            description: "Returns global cryptocurrency market data.".into(),
            parameters: vec![],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        Ok(data_result("get_crypto_global_market_data", self.market.global().await?))
    }
}

/// Spot price of a coin
pub struct CoinPriceTool {
    sources: DataSources,
}

impl CoinPriceTool {
    pub const fn new(sources: DataSources) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Tool for CoinPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_coin_price".into(),
            description: "Returns the price of a specific cryptocurrency in a given currency.".into(),
            parameters: vec![
                ParameterSchema::string("vs_currency", "Quote currency, e.g. usd").with_default("inr"),
                coin_param("Coin name, symbol or id"),
            ],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let vs_currency = call.required_str("vs_currency")?.to_lowercase();
        let coin_id = self.sources.resolver.find_coin_id(call.required_str("coin_id")?);
        tracing::debug!(%coin_id, %vs_currency, "Fetching coin price");
        let prices = self.sources.market.simple_price(&coin_id, &vs_currency).await?;
        Ok(data_result("get_coin_price", prices))
    }
}

/// Coin description, links and rank
pub struct CoinInfoTool {
    sources: DataSources,
}

impl CoinInfoTool {
    pub const fn new(sources: DataSources) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Tool for CoinInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_coin_info".into(),
            description: "Get detailed information about a coin (description, market cap rank, categories, website, social links, etc.)".into(),
            parameters: vec![coin_param("Coin name, symbol or id")],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let coin_id = self.sources.resolver.find_coin_id(call.required_str("coin_id")?);
        Ok(data_result("get_coin_info", self.sources.market.coin(&coin_id).await?))
    }
}

/// Price changes, market cap, volume, ATH/ATL
pub struct CoinMarketDataTool {
    sources: DataSources,
}

impl CoinMarketDataTool {
    pub const fn new(sources: DataSources) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Tool for CoinMarketDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_coin_market_data".into(),
            description: "Get comprehensive market data for a coin (current price, 24h/7d/30d changes, market cap, volume, ATH, ATL, etc.)".into(),
            parameters: vec![coin_param("Coin name, symbol or id")],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let coin_id = self.sources.resolver.find_coin_id(call.required_str("coin_id")?);
        Ok(data_result(
            "get_coin_market_data",
            self.sources.market.coin_markets(&coin_id).await?,
        ))
    }
}

/// CoinGecko search, exposed to the model as news lookup
pub struct CryptoNewsTool {
    market: Arc<dyn MarketDataApi>,
}

impl CryptoNewsTool {
    pub fn new(market: Arc<dyn MarketDataApi>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CryptoNewsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_crypto_news".into(),
            description: "Search for news and information about cryptocurrencies".into(),
            parameters: vec![ParameterSchema::string("query", "Search terms").with_default("bitcoin")],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.required_str("query")?;
        Ok(data_result("search_crypto_news", self.market.search(query).await?))
    }
}

/// Price history between two dates
pub struct CryptoHistoryTool {
    sources: DataSources,
}

impl CryptoHistoryTool {
    pub const NAME: &'static str = "get_crypto_historical_data";

    pub const fn new(sources: DataSources) -> Self {
        Self { sources }
    }
}

/// Unix timestamp (seconds) of `YYYY-MM-DD` at UTC midnight
fn day_start(date: &str) -> CoreResult<i64> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp())
        .ok_or_else(|| AgentError::ToolValidation(format!("dates must be YYYY-MM-DD, got {date:?}")))
}

#[async_trait]
impl Tool for CryptoHistoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Get historical market data for a cryptocurrency between two dates.".into(),
            parameters: vec![
                ParameterSchema::string("from_date", "Start date, YYYY-MM-DD"),
                ParameterSchema::string("to_date", "End date, YYYY-MM-DD"),
                ParameterSchema::string("base_currency", "Coin name, symbol or id"),
                ParameterSchema::string("target_currency", "Quote currency, e.g. usd"),
            ],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let from = day_start(call.required_str("from_date")?)?;
        let to = day_start(call.required_str("to_date")?)?;
        let coin_id = self.sources.resolver.find_coin_id(call.required_str("base_currency")?);
        let vs_currency = call.required_str("target_currency")?.to_lowercase();
        tracing::debug!(%coin_id, from, to, "Fetching price history");
        let history = self
            .sources
            .market
            .market_chart_range(&coin_id, &vs_currency, from, to)
            .await?;
        Ok(data_result(Self::NAME, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svckit::fixtures::sources;

    #[test]
    fn test_day_start() {
        assert_eq!(day_start("2023-11-14").unwrap(), 1_699_920_000);
        assert!(matches!(day_start("14/11/2023"), Err(AgentError::ToolValidation(_))));
    }

    #[tokio::test]
    async fn test_coin_price_resolves_symbol() {
        let tool = CoinPriceTool::new(sources());
        let call = ToolCall::new("get_coin_price").arg("vs_currency", "USD").arg("coin_id", "ETH");
        let result = tool.execute(&call).await.unwrap();
        assert_eq!(result.payload()["ethereum"]["usd"], 3_450.0);
    }

    #[tokio::test]
    async fn test_unknown_coin_is_error() {
        let tool = CoinInfoTool::new(sources());
        let call = ToolCall::new("get_coin_info").arg("coin_id", "qqxyzunknown");
        assert!(matches!(tool.execute(&call).await, Err(AgentError::ToolExecution(_))));
    }

    #[tokio::test]
    async fn test_global_has_dominance() {
        let tool = GlobalMarketTool::new(sources().market);
        let result = tool.execute(&ToolCall::new("get_crypto_global_market_data")).await.unwrap();
        assert!(result.payload().pointer("/data/market_cap_percentage/btc").is_some());
    }

    #[tokio::test]
    async fn test_history_rejects_bad_dates() {
        let tool = CryptoHistoryTool::new(sources());
        let call = ToolCall::new(CryptoHistoryTool::NAME)
            .arg("from_date", "last week")
            .arg("to_date", "2024-01-03")
            .arg("base_currency", "bitcoin")
            .arg("target_currency", "usd");
        assert!(tool.execute(&call).await.is_err());
    }
}
