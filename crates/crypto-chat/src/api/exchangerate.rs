//! exchangerate.host Client

use async_trait::async_trait;
use serde_json::Value;

use super::{FxRatesApi, json_body};
use crate::config::ServiceConfig;
use crate::error::Result;

const SERVICE: &str = "exchangerate.host";

pub struct ExchangeRateClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl ExchangeRateClient {
    pub const fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let mut request = self.http.get(self.config.url(path)).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("access_key", key)]);
        }
        json_body(SERVICE, request.send().await?).await
    }
}

#[async_trait]
impl FxRatesApi for ExchangeRateClient {
    async fn convert(&self, from: &str, to: &str, amount: f64) -> Result<Value> {
        let amount = amount.to_string();
        self.get("convert", &[("from", from), ("to", to), ("amount", &amount)])
            .await
    }

    async fn timeframe(&self, source: &str, currencies: &str, start_date: &str, end_date: &str) -> Result<Value> {
        self.get(
            "timeframe",
            &[
                ("source", source),
                ("currencies", currencies),
                ("start_date", start_date),
                ("end_date", end_date),
            ],
        )
        .await
    }

    fn name(&self) -> &str {
        SERVICE
    }
}
