//! Service Kit - Chatbot Tools
//!
//! The functions the LLM may call, as `agent_core::Tool` implementations.
//! Registration order is the order the tools are listed in the planning prompt.

mod category;
mod coins;
mod fx;
mod nft;

pub use category::{DetermineCategoryTool, GreetTool};
pub use coins::{CoinInfoTool, CoinMarketDataTool, CoinPriceTool, CryptoHistoryTool, CryptoNewsTool, GlobalMarketTool};
pub use fx::{ConvertCurrencyTool, ExchangeRatePeriodTool, ExchangeRateTool};
pub use nft::{NftInfoTool, NftSearchTool};

use std::sync::Arc;

use agent_core::{Result as CoreResult, ToolRegistry, ToolResult};
use serde_json::Value;

use crate::api::{FxRatesApi, MarketDataApi};
use crate::resolver::CategoryResolver;

/// Misspelled name some models emit for `get_crypto_historical_data`
pub const HISTORICAL_DATA_ALIAS: &str = "get_crypto_histrical_data";

/// What the data tools talk to
#[derive(Clone)]
pub struct DataSources {
    pub market: Arc<dyn MarketDataApi>,
    pub fx: Arc<dyn FxRatesApi>,
    pub resolver: CategoryResolver,
}

/// Registry with every chatbot tool, in prompt order
pub fn build_registry(sources: &DataSources) -> CoreResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(DetermineCategoryTool::new(sources.resolver.clone()));
    registry.register(GlobalMarketTool::new(sources.market.clone()));
    registry.register(CoinPriceTool::new(sources.clone()));
    registry.register(CoinInfoTool::new(sources.clone()));
    registry.register(CoinMarketDataTool::new(sources.clone()));
    registry.register(CryptoNewsTool::new(sources.market.clone()));
    registry.register(ExchangeRateTool::new(sources.fx.clone()));
    registry.register(ConvertCurrencyTool::new(sources.fx.clone()));
    registry.register(GreetTool);
    registry.register(ExchangeRatePeriodTool::new(sources.fx.clone()));
    registry.register(CryptoHistoryTool::new(sources.clone()));
    registry.register(NftInfoTool::new(sources.clone()));
    registry.register(NftSearchTool::new(sources.resolver.clone()));
    registry.alias(HISTORICAL_DATA_ALIAS, CryptoHistoryTool::NAME)?;
    Ok(registry)
}

/// Successful result carrying `data` as its payload
fn data_result(name: &str, data: Value) -> ToolResult {
    ToolResult::success(name, data.to_string()).with_data(data)
}

/// Insert metadata fields into an object result; other shapes are left alone.
fn tag(mut data: Value, fields: &[(&str, &str)]) -> Value {
    if let Some(object) = data.as_object_mut() {
        for (key, value) in fields {
            object.insert((*key).to_string(), Value::from(*value));
        }
    }
    data
}


#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::parse_call;
    use serde_json::json;

    async fn run(registry: &ToolRegistry, source: &str) -> ToolResult {
        let call = registry.bind(&parse_call(source).unwrap()).unwrap();
        registry.execute(&call).await.unwrap()
    }

    #[test]
    fn test_prompt_order() {
        let registry = build_registry(&fixtures::sources()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "determine_category",
                "get_crypto_global_market_data",
                "get_coin_price",
                "get_coin_info",
                "get_coin_market_data",
                "search_crypto_news",
                "get_exchange_rate",
                "convert_currency",
                "greet",
                "get_exchange_rate_for_time_period",
                "get_crypto_historical_data",
                "get_nft_info",
                "search_nft",
            ]
        );
        let section = registry.generate_prompt_section();
        assert!(section.contains(r#"3. get_coin_price(vs_currency="inr", coin_id="bitcoin") - "#));
        assert!(section.contains("8. convert_currency(from_currency, to_currency, amount) - "));
    }

    #[tokio::test]
    async fn test_alias_dispatches_to_history() {
        let registry = build_registry(&fixtures::sources()).unwrap();
        let result = run(
            &registry,
            r#"get_crypto_histrical_data("2024-01-01", "2024-01-03", "btc", "usd")"#,
        )
        .await;
        assert_eq!(result.payload()["prices"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_defaults_apply() {
        let registry = build_registry(&fixtures::sources()).unwrap();
        let result = run(&registry, "get_coin_price()").await;
        assert!(result.payload()["bitcoin"]["inr"].is_number());
    }

    #[test]
    fn test_tag_only_objects() {
        assert_eq!(tag(json!({"a": 1}), &[("b", "x")]), json!({"a": 1, "b": "x"}));
        assert_eq!(tag(json!([1]), &[("b", "x")]), json!([1]));
    }
}
