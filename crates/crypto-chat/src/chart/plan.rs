//! Which charts to draw for one turn's tool results.

use serde_json::Value;

use super::{ChartSpec, dispatch};

/// Chart family named by the visualization decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Comparison,
    TimeSeries,
    MarketShare,
}

impl ChartKind {
    const KEYWORDS: [(&'static str, Self); 3] = [
        ("COMPARISON", Self::Comparison),
        ("TIME_SERIES", Self::TimeSeries),
        ("MARKET_SHARE", Self::MarketShare),
    ];
}

/// Parsed answer of the visualization prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualizationDecision {
    No,
    Yes(Option<ChartKind>),
}

impl VisualizationDecision {
    /// `GRAPH: YES` or any chart-type keyword means yes; anything else is no.
    pub fn parse(text: &str) -> Self {
        let upper = text.to_uppercase();
        let kind = ChartKind::KEYWORDS
            .iter()
            .filter_map(|(keyword, kind)| upper.find(keyword).map(|at| (at, *kind)))
            .min_by_key(|(at, _)| *at)
            .map(|(_, kind)| kind);
        if kind.is_some() || upper.contains("GRAPH: YES") {
            Self::Yes(kind)
        } else {
            Self::No
        }
    }

    pub const fn wants_chart(self) -> bool {
        matches!(self, Self::Yes(_))
    }

    const fn is_comparison(self) -> bool {
        matches!(self, Self::Yes(Some(ChartKind::Comparison)))
    }
}

/// Charts for a turn's results.
///
/// Several exchange rates get one chart each, as do several time series.
/// A comparison of single values (or of coin price mappings) collapses into
/// one chart over the whole list. Otherwise each result is charted on its own.
pub fn plan_charts(results: &[Value], decision: VisualizationDecision) -> Vec<ChartSpec> {
    if !decision.wants_chart() || results.is_empty() {
        return Vec::new();
    }

    let many = results.len() > 1;
    let all_exchange_rates = results.iter().all(is_exchange_rate);
    let all_coin_prices = results.iter().all(is_coin_price);
    let all_single_values = results.iter().all(is_single_value);

    if many && all_exchange_rates {
        tracing::debug!(count = results.len(), "Charting exchange rates individually");
        return each(results);
    }
    if many && (decision.is_comparison() || all_coin_prices) && (all_single_values || all_coin_prices) {
        tracing::debug!(count = results.len(), "Charting results as one comparison");
        return dispatch(&Value::Array(results.to_vec())).into_iter().collect();
    }
    each(results)
}

fn each(results: &[Value]) -> Vec<ChartSpec> {
    results.iter().filter_map(dispatch).collect()
}

fn has_series(value: &Value) -> bool {
    value.get("prices").is_some() || value.get("quotes").is_some()
}

fn is_exchange_rate(value: &Value) -> bool {
    value
        .get("query")
        .is_some_and(|q| q.get("from").is_some() && q.get("to").is_some())
}

/// `{"bitcoin": {"usd": 92265}}`
fn is_coin_price(value: &Value) -> bool {
    value.as_object().is_some_and(|fields| {
        fields.len() == 1
            && !fields.contains_key("query")
            && !has_series(value)
            && fields.values().next().is_some_and(Value::is_object)
    })
}

fn is_single_value(value: &Value) -> bool {
    value.is_object()
        && (value.get("query").is_some() || value.get("result").is_some())
        && !has_series(value)
}
