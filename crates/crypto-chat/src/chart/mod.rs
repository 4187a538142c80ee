//! Chart Shape Dispatcher
//!
//! Turns raw tool results into Chart.js configurations. Detection is an
//! ordered table of (shape, predicate, builder); the first predicate that
//! matches decides the chart, and a builder that finds nothing usable yields
//! no chart. Inputs are never mutated and unrecognized shapes are not errors.

mod builders;
mod plan;

pub(crate) use builders::grouped;
pub use plan::{ChartKind, VisualizationDecision, plan_charts};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chart.js chart type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Doughnut,
}

/// One color for the whole dataset, or one per bar/slice
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Solid(String),
    Palette(Vec<String>),
}

/// A Chart.js dataset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub background_color: Paint,
    pub border_color: Paint,
    pub border_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<u32>,
}

impl Dataset {
    fn bars(label: Option<String>, data: Vec<f64>, background: Paint, border: Paint) -> Self {
        Self {
            label,
            data,
            background_color: background,
            border_color: border,
            border_width: 2,
            fill: None,
            tension: None,
            point_radius: None,
            point_hover_radius: None,
        }
    }

    fn line(label: String, data: Vec<f64>, border: &str, background: &str, point_radius: u32) -> Self {
        Self {
            label: Some(label),
            data,
            background_color: Paint::Solid(background.into()),
            border_color: Paint::Solid(border.into()),
            border_width: 2,
            fill: Some(true),
            tension: Some(0.4),
            point_radius: Some(point_radius),
            point_hover_radius: Some(point_radius + 3),
        }
    }
}

/// Labels plus datasets
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Summary statistics of a plotted series
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// `max - min`
    pub change: f64,
    /// `change` relative to `min`, in percent; zero when `min <= 0`
    pub change_pct: f64,
}

impl SeriesStats {
    /// `None` for an empty series
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let change = max - min;
        let change_pct = if min > 0.0 { change / min * 100.0 } else { 0.0 };
        Some(Self {
            min,
            max,
            avg,
            change,
            change_pct,
        })
    }
}

/// A renderable chart configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: ChartData,
    pub options: Value,
    /// Statistics behind time-series titles; not part of the wire format
    #[serde(skip)]
    pub stats: Option<SeriesStats>,
}

impl ChartSpec {
    pub fn title(&self) -> Option<&str> {
        self.options.pointer("/plugins/title/text").and_then(Value::as_str)
    }
}

/// A recognizable result shape
struct Shape {
    name: &'static str,
    matches: fn(&Value) -> bool,
    build: fn(&Value) -> Option<ChartSpec>,
}

/// Dispatch priority, highest first
const SHAPES: &[Shape] = &[
    Shape {
        name: "single_exchange_rate",
        matches: is_exchange_rate,
        build: builders::single_exchange_rate,
    },
    Shape {
        name: "exchange_rate_list",
        matches: is_exchange_rate_list,
        build: builders::exchange_rate_comparison,
    },
    Shape {
        name: "price_history",
        matches: has_price_series,
        build: builders::price_history,
    },
    Shape {
        name: "comparison",
        matches: is_comparison_list,
        build: builders::comparison,
    },
    Shape {
        name: "market_dominance",
        matches: has_market_cap_percentage,
        build: builders::market_dominance,
    },
    Shape {
        name: "exchange_rate_series",
        matches: has_quotes,
        build: builders::exchange_rate_series,
    },
];

/// Chart for one tool result (or a list of results), if its shape is known.
pub fn dispatch(value: &Value) -> Option<ChartSpec> {
    let shape = SHAPES.iter().find(|shape| (shape.matches)(value))?;
    let chart = (shape.build)(value);
    tracing::debug!(shape = shape.name, built = chart.is_some(), "Chart shape matched");
    chart
}

/// `{"query": {...}, "result": ...}`
fn is_exchange_rate(value: &Value) -> bool {
    value.get("query").is_some_and(Value::is_object) && value.get("result").is_some()
}

fn is_exchange_rate_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| !items.is_empty() && items.iter().all(is_exchange_rate))
}

/// `{"prices": [[ts_ms, value], ...]}`
fn has_price_series(value: &Value) -> bool {
    value.get("prices").is_some_and(Value::is_array)
}

fn is_comparison_list(value: &Value) -> bool {
    value.as_array().is_some_and(|items| items.len() > 1)
}

/// `market_cap_percentage`, at the top level or under `data` (CoinGecko `/global`)
fn has_market_cap_percentage(value: &Value) -> bool {
    market_cap_percentage(value).is_some()
}

fn market_cap_percentage(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    value
        .pointer("/data/market_cap_percentage")
        .or_else(|| value.get("market_cap_percentage"))
        .and_then(Value::as_object)
}

/// `{"quotes": {"YYYY-MM-DD": {"SRCTGT": rate}}}`
fn has_quotes(value: &Value) -> bool {
    value.get("quotes").is_some_and(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_exchange_rate() {
        let input = json!({"query": {"from": "USD", "to": "EUR"}, "result": 1.0823, "info": {}});
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.data.labels, vec!["USD/EUR"]);
        assert_eq!(chart.data.datasets[0].data, vec![1.0823]);
        assert_eq!(chart.data.datasets[0].label.as_deref(), Some("1 USD = 1.0823 EUR"));
        assert_eq!(chart.title(), Some("USD to EUR Exchange Rate"));
    }

    #[test]
    fn test_price_history() {
        let input = json!({"prices": [[1_700_000_000_000_i64, 50000], [1_700_086_400_000_i64, 52000]]});
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.chart_type, ChartType::Line);
        assert_eq!(chart.data.labels, vec!["Nov 14, 2023", "Nov 15, 2023"]);
        let stats = chart.stats.unwrap();
        assert!((stats.min - 50000.0).abs() < f64::EPSILON);
        assert!((stats.max - 52000.0).abs() < f64::EPSILON);
        assert_eq!(
            chart.data.datasets[0].label.as_deref(),
            Some("Price (Range: $50,000 - $52,000)")
        );
        assert_eq!(chart.title(), Some("Price History (Change: $2,000 / +4.00%)"));
    }

    #[test]
    fn test_exchange_rate_list() {
        let input = json!([
            {"query": {"from": "USD", "to": "INR"}, "result": 83.2, "info": {}},
            {"query": {"from": "USD", "to": "JPY"}, "result": 149.5, "info": {}},
        ]);
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["USD/INR", "USD/JPY"]);
        assert_eq!(chart.title(), Some("Currency Exchange Rate Comparison"));
        assert!(matches!(chart.data.datasets[0].background_color, Paint::Palette(ref p) if p.len() == 5));
    }

    #[test]
    fn test_coin_price_comparison() {
        let input = json!([{"bitcoin": {"usd": 92265}}, {"ethereum": {"usd": 3245.5}}]);
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["Bitcoin", "Ethereum"]);
        assert_eq!(chart.data.datasets[0].data, vec![92265.0, 3245.5]);
        assert_eq!(chart.title(), Some("Cryptocurrency Price Comparison"));
        assert_eq!(
            chart.options.pointer("/scales/y/title/text").and_then(Value::as_str),
            Some("Price in USD ($)")
        );
    }

    #[test]
    fn test_coin_price_and_exchange_rate_comparison() {
        let input = json!([
            {"bitcoin": {"usd": 92265}},
            {
                "query": {"from": "USD", "to": "EUR", "amount": 1},
                "info": {"timestamp": 1, "quote": 0.92},
                "result": 0.92,
                "_from_currency": "USD",
                "_to_currency": "EUR"
            }
        ]);
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["Bitcoin", "USD/EUR"]);
        assert_eq!(chart.data.datasets[0].data, vec![92265.0, 0.92]);
        assert_eq!(
            chart.options.pointer("/scales/y/title/text").and_then(Value::as_str),
            Some("Exchange Rate")
        );
    }

    #[test]
    fn test_market_dominance() {
        let input = json!({"data": {"market_cap_percentage": {"btc": 56.8, "eth": 12.1}}});
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.chart_type, ChartType::Doughnut);
        assert_eq!(chart.data.labels, vec!["BTC", "ETH"]);
        assert_eq!(chart.title(), Some("Cryptocurrency Market Dominance"));
    }

    #[test]
    fn test_exchange_rate_series() {
        let input = json!({
            "source": "USD",
            "start_date": "2024-01-02",
            "end_date": "2024-01-03",
            "quotes": {
                "2024-01-03": {"USDEUR": 0.92},
                "2024-01-01": {"USDEUR": 0.80},
                "2024-01-02": {"USDEUR": 0.90},
            }
        });
        let chart = dispatch(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(chart.data.datasets[0].data, vec![0.90, 0.92]);
        let stats = chart.stats.unwrap();
        assert!((stats.avg - 0.91).abs() < 1e-9);
        assert_eq!(
            chart.data.datasets[0].label.as_deref(),
            Some("1 USD = 0.9100 EUR (Average)")
        );
        assert_eq!(
            chart.title(),
            Some("USD to EUR Exchange Rate (Range: 0.9000 - 0.9200, Change: +2.22%)")
        );
    }

    #[test]
    fn test_not_chartable() {
        let cases = [
            json!([]),
            json!({"prices": []}),
            json!({"bitcoin": {"usd": 1}}),
            json!({"error": "not found"}),
            json!("Hello, Ana!"),
            json!([{"bitcoin": {"usd": 1}}]),
            json!({"query": {"from": "USD", "to": "EUR"}, "result": 0}),
            json!({"quotes": {}}),
            Value::Null,
        ];
        for input in &cases {
            assert!(dispatch(input).is_none(), "{input} should not chart");
        }
    }

    #[test]
    fn test_dispatch_is_pure() {
        let input = json!({"prices": [[1_700_000_000_000_i64, 1.0], [1_700_086_400_000_i64, 2.0]]});
        let before = input.clone();
        assert_eq!(dispatch(&input), dispatch(&input));
        assert_eq!(input, before);
    }

    #[test]
    fn test_wire_format() {
        let input = json!({"query": {"from": "GBP", "to": "INR"}, "result": 105.5, "info": {}});
        let wire = serde_json::to_value(dispatch(&input).unwrap()).unwrap();
        assert_eq!(wire["type"], "bar");
        assert_eq!(wire["data"]["datasets"][0]["backgroundColor"], "rgba(102, 126, 234, 0.6)");
        assert_eq!(wire["data"]["datasets"][0]["borderWidth"], 2);
        assert!(wire.get("stats").is_none());
    }

    #[test]
    fn test_series_stats() {
        let stats = SeriesStats::of(&[2.0, 4.0]).unwrap();
        assert!((stats.change_pct - 100.0).abs() < f64::EPSILON);
        assert!(SeriesStats::of(&[]).is_none());
        assert!(SeriesStats::of(&[-1.0, 1.0]).unwrap().change_pct.abs() < f64::EPSILON);
    }
}
