//! Result Summarizer
//!
//! Lossy projection of tool results shown to the LLM. Charts are always built
//! from the full results; only the phrasing prompts see these summaries.

use serde_json::{Value, json};

const DESCRIPTION_LIMIT: usize = 200;
const MIN_HISTORY_POINTS: usize = 6;

/// Summary of one tool result; unrecognized shapes are returned unchanged.
pub fn summarize(result: &Value) -> Value {
    if result.get("floor_price").is_some_and(Value::is_object) {
        return nft_summary(result);
    }
    if let Some(prices) = result.get("prices").and_then(Value::as_array) {
        return price_history_summary(prices).unwrap_or_else(|| result.clone());
    }
    if let Some(quotes) = result.get("quotes").and_then(Value::as_object) {
        let source = result.get("source").and_then(Value::as_str).unwrap_or("N/A");
        let targets = quotes
            .values()
            .next()
            .and_then(Value::as_object)
            .map(|day| {
                day.keys()
                    .map(|pair| pair.strip_prefix(source).unwrap_or(pair))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|targets| !targets.is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        return json!({
            "type": "exchange_rate_time_series",
            "currency_pair": format!("{source} to {targets}"),
            "data_points": quotes.len(),
        });
    }
    result.clone()
}

/// Text block for a prompt: one result pretty-printed (strings verbatim),
/// several results as a JSON array.
pub fn render_for_prompt(summaries: &[Value]) -> String {
    match summaries {
        [Value::String(text)] => text.clone(),
        [single] => serde_json::to_string_pretty(single).unwrap_or_else(|_| single.to_string()),
        many => serde_json::to_string_pretty(many).unwrap_or_else(|_| Value::from(many.to_vec()).to_string()),
    }
}

fn usd(value: &Value, key: &str) -> Value {
    value
        .get(key)
        .filter(|v| v.is_object())
        .and_then(|v| v.get("usd"))
        .cloned()
        .unwrap_or_else(|| json!(0))
}

fn nft_summary(data: &Value) -> Value {
    let text = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or_default();
    let description: String = text("description").chars().take(DESCRIPTION_LIMIT).collect();
    let links = data.get("links");
    let link = |key: &str| links.and_then(|l| l.get(key)).cloned().unwrap_or_else(|| json!(""));
    let floor = &data["floor_price"];

    json!({
        "type": "nft_data",
        "name": data.get("name").and_then(Value::as_str).unwrap_or("Unknown NFT"),
        "description": description,
        "floor_price_usd": floor.get("usd").cloned().unwrap_or_else(|| json!(0)),
        "floor_price_eth": floor.get("native_currency").cloned().unwrap_or_else(|| json!(0)),
        "market_cap_usd": usd(data, "market_cap"),
        "volume_24h_usd": usd(data, "volume_24h"),
        "total_supply": data.get("total_supply").cloned().unwrap_or_else(|| json!(0)),
        "floor_price_24h_change": usd(data, "floor_price_24h_percentage_change"),
        "website": link("homepage"),
        "twitter": link("twitter"),
        "native_currency": data.get("native_currency").and_then(Value::as_str).unwrap_or("ETH"),
    })
}

/// `None` for short or malformed series, which are passed through whole
fn price_history_summary(prices: &[Value]) -> Option<Value> {
    if prices.len() < MIN_HISTORY_POINTS {
        return None;
    }
    let values: Vec<f64> = prices
        .iter()
        .map(|point| point.get(1).and_then(Value::as_f64))
        .collect::<Option<_>>()?;
    let highest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);
    Some(json!({
        "type": "crypto_historical_data",
        "data_points": values.len(),
        "first_price": values.first(),
        "last_price": values.last(),
        "highest": highest,
        "lowest": lowest,
        "summary": format!("Historical price data with {} data points", values.len()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nft_summary() {
        let input = json!({
            "name": "Meebits",
            "description": "x".repeat(500),
            "floor_price": {"usd": 1393.87, "native_currency": 0.42},
            "market_cap": {"usd": 27_800_000},
            "links": {"homepage": "https://meebits.app"},
            "native_currency": "ethereum"
        });
        let summary = summarize(&input);
        assert_eq!(summary["type"], "nft_data");
        assert_eq!(summary["floor_price_usd"], 1393.87);
        assert_eq!(summary["market_cap_usd"], 27_800_000);
        assert_eq!(summary["volume_24h_usd"], 0);
        assert_eq!(summary["description"].as_str().unwrap().len(), 200);
        assert_eq!(summary["twitter"], "");
    }

    #[test]
    fn test_long_price_history_summarized() {
        let prices: Vec<Value> = (0..10).map(|i| json!([i * 1000, 100 + i])).collect();
        let summary = summarize(&json!({"prices": prices}));
        assert_eq!(summary["type"], "crypto_historical_data");
        assert_eq!(summary["data_points"], 10);
        assert_eq!(summary["first_price"], 100.0);
        assert_eq!(summary["highest"], 109.0);
    }

    #[test]
    fn test_short_price_history_unchanged() {
        let input = json!({"prices": [[1, 2.0], [2, 3.0]]});
        assert_eq!(summarize(&input), input);
    }

    #[test]
    fn test_quotes_summary() {
        let input = json!({"source": "USD", "quotes": {"2024-01-01": {"USDEUR": 0.9}, "2024-01-02": {"USDEUR": 0.91}}});
        let summary = summarize(&input);
        assert_eq!(summary["currency_pair"], "USD to EUR");
        assert_eq!(summary["data_points"], 2);
    }

    #[test]
    fn test_other_results_unchanged() {
        let input = json!({"bitcoin": {"usd": 90052}});
        assert_eq!(summarize(&input), input);
    }

    #[test]
    fn test_render_for_prompt() {
        assert_eq!(render_for_prompt(&[json!("Hello, Ana!")]), "Hello, Ana!");
        assert!(render_for_prompt(&[json!({"a": 1})]).starts_with('{'));
        assert!(render_for_prompt(&[json!(1), json!(2)]).starts_with('['));
    }
}
