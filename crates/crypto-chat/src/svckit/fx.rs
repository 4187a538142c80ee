//! Fiat exchange-rate tools (exchangerate.host)

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{AgentError, ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{data_result, tag};
use crate::api::FxRatesApi;

const CATEGORY: &str = "exchange_rates";

fn currency(call: &ToolCall, key: &str) -> CoreResult<String> {
    Ok(call.required_str(key)?.trim().to_uppercase())
}

/// Latest rate between two currencies
pub struct ExchangeRateTool {
    fx: Arc<dyn FxRatesApi>,
}

impl ExchangeRateTool {
    pub fn new(fx: Arc<dyn FxRatesApi>) -> Self {
        Self { fx }
    }
}

#[async_trait]
impl Tool for ExchangeRateTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_exchange_rate".into(),
            description: "Get latest exchange rate between two currencies.".into(),
            parameters: vec![
                ParameterSchema::string("from_currency", "ISO currency code").with_default("USD"),
                ParameterSchema::string("to_currency", "ISO currency code").with_default("EUR"),
            ],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let from = currency(call, "from_currency")?;
        let to = currency(call, "to_currency")?;
        let rate = self.fx.convert(&from, &to, 1.0).await?;
        // The pair travels with the result so comparisons can label it
        let rate = tag(rate, &[("_from_currency", from.as_str()), ("_to_currency", to.as_str())]);
        Ok(data_result("get_exchange_rate", rate))
    }
}

/// Amount conversion
pub struct ConvertCurrencyTool {
    fx: Arc<dyn FxRatesApi>,
}

impl ConvertCurrencyTool {
    pub fn new(fx: Arc<dyn FxRatesApi>) -> Self {
        Self { fx }
    }
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "convert_currency".into(),
            description: "Convert an amount from one currency to another.".into(),
            parameters: vec![
                ParameterSchema::string("from_currency", "ISO currency code"),
                ParameterSchema::string("to_currency", "ISO currency code"),
                ParameterSchema::number("amount", "Amount in from_currency"),
            ],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let from = currency(call, "from_currency")?;
        let to = currency(call, "to_currency")?;
        let amount = call
            .f64_arg("amount")
            .ok_or_else(|| AgentError::ToolValidation("amount must be a number".into()))?;
        Ok(data_result("convert_currency", self.fx.convert(&from, &to, amount).await?))
    }
}

/// Daily rates over a date range
pub struct ExchangeRatePeriodTool {
    fx: Arc<dyn FxRatesApi>,
}

impl ExchangeRatePeriodTool {
    pub fn new(fx: Arc<dyn FxRatesApi>) -> Self {
        Self { fx }
    }
}

#[async_trait]
impl Tool for ExchangeRatePeriodTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_exchange_rate_for_time_period".into(),
            description: "Get exchange rates for a date range. Dates must be in YYYY-MM-DD format.".into(),
            parameters: vec![
                ParameterSchema::string("from_currency", "ISO currency code"),
                ParameterSchema::string("to_currency", "ISO currency code"),
                ParameterSchema::string("start_date", "YYYY-MM-DD"),
                ParameterSchema::string("end_date", "YYYY-MM-DD"),
            ],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let from = currency(call, "from_currency")?;
        let to = currency(call, "to_currency")?;
        let start = call.required_str("start_date")?.trim();
        let end = call.required_str("end_date")?.trim();
        let series = self.fx.timeframe(&from, &to, start, end).await?;
        // The chart narrows the series to the requested window
        let series = tag(series, &[("start_date", start), ("end_date", end)]);
        Ok(data_result("get_exchange_rate_for_time_period", series))
    }
}
