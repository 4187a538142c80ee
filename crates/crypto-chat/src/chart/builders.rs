//! One builder per recognized shape. Each returns `None` when the input
//! carries nothing plottable.

use chrono::DateTime;
use serde_json::{Map, Value, json};

use super::{ChartData, ChartSpec, ChartType, Dataset, Paint, SeriesStats, market_cap_percentage};

const FX_FILL: &str = "rgba(102, 126, 234, 0.6)";
const FX_BORDER: &str = "rgb(102, 126, 234)";

const FX_PALETTE: [(u8, u8, u8); 5] = [
    (102, 126, 234),
    (118, 75, 162),
    (237, 100, 166),
    (255, 154, 158),
    (250, 208, 196),
];

const COMPARISON_PALETTE: [(u8, u8, u8); 5] = [
    (102, 126, 234),
    (118, 75, 162),
    (247, 147, 26),
    (34, 211, 238),
    (251, 191, 36),
];

const DOMINANCE_PALETTE: [&str; 6] = [
    "rgba(247, 147, 26, 0.8)",
    "rgba(98, 126, 234, 0.8)",
    "rgba(38, 161, 123, 0.8)",
    "rgba(243, 186, 47, 0.8)",
    "rgba(0, 51, 173, 0.8)",
    "rgba(150, 150, 150, 0.8)",
];

const HISTORY_BORDER: &str = "#F7931A";
const HISTORY_FILL: &str = "rgba(247, 147, 26, 0.1)";
const SERIES_BORDER: &str = "rgb(46, 134, 171)";
const SERIES_FILL: &str = "rgba(46, 134, 171, 0.1)";

/// `{"query": {"from", "to"}, "result": rate}`
pub(super) fn single_exchange_rate(value: &Value) -> Option<ChartSpec> {
    let (label, rate) = fx_pair(value)?;
    let (from, to) = label.split_once('/')?;
    Some(bar_chart(
        vec![label.clone()],
        Dataset::bars(
            Some(format!("1 {from} = {rate:.4} {to}")),
            vec![rate],
            Paint::Solid(FX_FILL.into()),
            Paint::Solid(FX_BORDER.into()),
        ),
        axis_options(&format!("{from} to {to} Exchange Rate"), "Currency Pair", "Exchange Rate", false),
    ))
}

/// A list of exchange-rate results, one bar each
pub(super) fn exchange_rate_comparison(value: &Value) -> Option<ChartSpec> {
    let (labels, rates): (Vec<String>, Vec<f64>) = value.as_array()?.iter().filter_map(fx_pair).unzip();
    if labels.is_empty() {
        return None;
    }
    Some(bar_chart(
        labels,
        Dataset::bars(
            Some("Exchange Rate".into()),
            rates,
            Paint::Palette(palette(&FX_PALETTE, 0.6)),
            Paint::Palette(palette(&FX_PALETTE, 1.0)),
        ),
        axis_options(
            "Currency Exchange Rate Comparison",
            "Currency Pairs",
            "Exchange Rate Value",
            false,
        ),
    ))
}

/// `{"prices": [[timestamp_ms, price], ...]}`
pub(super) fn price_history(value: &Value) -> Option<ChartSpec> {
    let (labels, prices): (Vec<String>, Vec<f64>) = value
        .get("prices")?
        .as_array()?
        .iter()
        .filter_map(|point| {
            let point = point.as_array()?;
            let millis = point.first()?.as_f64()?;
            #[allow(clippy::cast_possible_truncation)]
            let at = DateTime::from_timestamp_millis(millis as i64)?;
            Some((at.format("%b %d, %Y").to_string(), number(point.get(1)?)?))
        })
        .unzip();
    let stats = SeriesStats::of(&prices)?;

    let mut options = axis_options(
        &format!(
            "Price History (Change: ${} / {:+.2}%)",
            grouped(stats.change, 0),
            stats.change_pct
        ),
        "Date",
        "Price in USD ($)",
        false,
    );
    options["plugins"]["legend"] = json!({"display": true, "position": "top"});
    options["interaction"] = json!({"intersect": false, "mode": "index"});

    Some(ChartSpec {
        chart_type: ChartType::Line,
        data: ChartData {
            labels,
            datasets: vec![Dataset::line(
                format!(
                    "Price (Range: ${} - ${})",
                    grouped(stats.min, 0),
                    grouped(stats.max, 0)
                ),
                prices,
                HISTORY_BORDER,
                HISTORY_FILL,
                3,
            )],
        },
        options,
        stats: Some(stats),
    })
}

/// A mixed list: coin price mappings and/or exchange-rate results
pub(super) fn comparison(value: &Value) -> Option<ChartSpec> {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    let mut exchange_rates = false;

    for item in value.as_array()? {
        let Some(fields) = item.as_object() else {
            continue;
        };
        // Exchange-rate bodies also hold nested objects (`query`, `info`)
        if let Some((label, rate)) = tagged_pair(fields).or_else(|| fx_pair(item)) {
            exchange_rates = true;
            labels.push(label);
            values.push(rate);
        } else if let Some((label, price)) = coin_price(fields) {
            labels.push(label);
            values.push(price);
        }
    }
    if labels.is_empty() {
        return None;
    }

    let (title, x_title, y_title, decimals) = if exchange_rates {
        ("Currency Exchange Rate Comparison", "Currency Pairs", "Exchange Rate", 4)
    } else {
        ("Cryptocurrency Price Comparison", "Cryptocurrencies", "Price in USD ($)", 2)
    };
    let mut options = axis_options(title, x_title, y_title, !exchange_rates);
    options["plugins"]["legend"] = json!({"display": false});
    options["plugins"]["tooltip"] = json!({"callbacks": {"decimals": decimals}});

    Some(bar_chart(
        labels,
        Dataset::bars(
            Some(y_title.into()),
            values,
            Paint::Palette(palette(&COMPARISON_PALETTE, 0.8)),
            Paint::Palette(palette(&COMPARISON_PALETTE, 1.0)),
        ),
        options,
    ))
}

/// `market_cap_percentage` as a doughnut
pub(super) fn market_dominance(value: &Value) -> Option<ChartSpec> {
    let (labels, shares): (Vec<String>, Vec<f64>) = market_cap_percentage(value)?
        .iter()
        .filter_map(|(symbol, share)| Some((symbol.to_uppercase(), number(share)?)))
        .unzip();
    if labels.is_empty() {
        return None;
    }
    Some(ChartSpec {
        chart_type: ChartType::Doughnut,
        data: ChartData {
            labels,
            datasets: vec![Dataset::bars(
                None,
                shares,
                Paint::Palette(DOMINANCE_PALETTE.iter().map(|c| (*c).to_string()).collect()),
                Paint::Solid("#ffffff".into()),
            )],
        },
        options: json!({
            "responsive": true,
            "plugins": {
                "title": {"display": true, "text": "Cryptocurrency Market Dominance", "font": {"size": 16}},
                "legend": {"display": true, "position": "right"}
            }
        }),
        stats: None,
    })
}

/// `{"source": "USD", "quotes": {"YYYY-MM-DD": {"USDEUR": rate}}}`, narrowed to
/// `start_date..=end_date` when both bounds are given.
pub(super) fn exchange_rate_series(value: &Value) -> Option<ChartSpec> {
    let quotes = value.get("quotes")?.as_object()?;
    let bound = |key: &str| value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    let window = bound("start_date").zip(bound("end_date"));

    let mut dates: Vec<&String> = quotes
        .keys()
        .filter(|date| window.is_none_or(|(start, end)| (start..=end).contains(&date.as_str())))
        .collect();
    dates.sort();

    let mut labels = Vec::new();
    let mut rates = Vec::new();
    let mut pair_key = None;
    for date in dates {
        let Some((key, rate)) = quotes[date].as_object().and_then(|day| day.iter().next()) else {
            continue;
        };
        if let Some(rate) = number(rate) {
            pair_key.get_or_insert(key.as_str());
            labels.push(date.clone());
            rates.push(rate);
        }
    }
    let stats = SeriesStats::of(&rates)?;

    let source = value.get("source").and_then(Value::as_str).unwrap_or("USD");
    let target = pair_key.map_or_else(String::new, |key| key.replacen(source, "", 1));

    let mut options = axis_options(
        &format!(
            "{source} to {target} Exchange Rate (Range: {:.4} - {:.4}, Change: {:+.2}%)",
            stats.min, stats.max, stats.change_pct
        ),
        "Date",
        &format!("Exchange Rate (1 {source} = ? {target})"),
        false,
    );
    options["plugins"]["legend"] = json!({"display": true, "position": "top"});
    options["interaction"] = json!({"intersect": false, "mode": "index"});

    Some(ChartSpec {
        chart_type: ChartType::Line,
        data: ChartData {
            labels,
            datasets: vec![Dataset::line(
                format!("1 {source} = {:.4} {target} (Average)", stats.avg),
                rates,
                SERIES_BORDER,
                SERIES_FILL,
                4,
            )],
        },
        options,
        stats: Some(stats),
    })
}

fn bar_chart(labels: Vec<String>, dataset: Dataset, options: Value) -> ChartSpec {
    ChartSpec {
        chart_type: ChartType::Bar,
        data: ChartData {
            labels,
            datasets: vec![dataset],
        },
        options,
        stats: None,
    }
}

fn axis_options(title: &str, x_title: &str, y_title: &str, begin_at_zero: bool) -> Value {
    json!({
        "responsive": true,
        "plugins": {
            "title": {"display": true, "text": title, "font": {"size": 16}},
            "legend": {"display": true}
        },
        "scales": {
            "y": {"beginAtZero": begin_at_zero, "title": {"display": true, "text": y_title}},
            "x": {"title": {"display": true, "text": x_title}}
        }
    })
}

fn palette(colors: &[(u8, u8, u8)], alpha: f64) -> Vec<String> {
    colors
        .iter()
        .map(|(r, g, b)| {
            if alpha >= 1.0 {
                format!("rgb({r}, {g}, {b})")
            } else {
                format!("rgba({r}, {g}, {b}, {alpha})")
            }
        })
        .collect()
}

/// `("FROM/TO", rate)` of an exchange-rate result; `None` when a field is
/// empty or the rate is zero.
fn fx_pair(value: &Value) -> Option<(String, f64)> {
    let query = value.get("query")?;
    let from = query.get("from").and_then(Value::as_str).filter(|s| !s.is_empty())?;
    let to = query.get("to").and_then(Value::as_str).filter(|s| !s.is_empty())?;
    let rate = value.get("result").and_then(number).filter(|r| *r != 0.0)?;
    Some((format!("{from}/{to}"), rate))
}

/// Pair tagged by the exchange-rate tool with `_from_currency`/`_to_currency`
fn tagged_pair(item: &Map<String, Value>) -> Option<(String, f64)> {
    let from = item.get("_from_currency").and_then(Value::as_str)?;
    let to = item.get("_to_currency").and_then(Value::as_str)?;
    let rate = item.get("result").and_then(number).unwrap_or(0.0);
    Some((format!("{from}/{to}"), rate))
}

/// `{"bitcoin": {"usd": 92265}}` becomes `("Bitcoin", 92265.0)`
fn coin_price(item: &Map<String, Value>) -> Option<(String, f64)> {
    item.iter().find_map(|(coin, quote)| {
        let price = quote.as_object()?.values().find_map(|v| v.as_f64())?;
        Some((capitalize(coin), price))
    })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// `1234567.8` with 0 decimals becomes `1,234,568`
pub(crate) fn grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = formatted.split_once('.').map_or((formatted.as_str(), None), |(w, f)| (w, Some(f)));

    let mut out = String::with_capacity(formatted.len() + whole.len() / 3 + 1);
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped() {
        assert_eq!(grouped(50000.0, 0), "50,000");
        assert_eq!(grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(grouped(999.6, 0), "1,000");
        assert_eq!(grouped(12.0, 0), "12");
        assert_eq!(grouped(-4321.0, 0), "-4,321");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bitcoin"), "Bitcoin");
        assert_eq!(capitalize("USD-coin"), "Usd-coin");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_tagged_exchange_rates_compare() {
        let input = json!([
            {"_from_currency": "USD", "_to_currency": "EUR", "result": 0.92},
            {"_from_currency": "USD", "_to_currency": "GBP", "result": 0.79},
        ]);
        let chart = comparison(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["USD/EUR", "USD/GBP"]);
        assert_eq!(chart.title(), Some("Currency Exchange Rate Comparison"));
        assert_eq!(chart.options["plugins"]["tooltip"]["callbacks"]["decimals"], 4);
    }

    #[test]
    fn test_convert_body_next_to_coin_price() {
        let input = json!([
            {"bitcoin": {"usd": 92265}},
            {
                "query": {"from": "USD", "to": "EUR", "amount": 1},
                "info": {"timestamp": 1, "quote": 0.92},
                "result": 0.92,
                "_from_currency": "USD",
                "_to_currency": "EUR"
            },
            {"query": {"from": "USD", "to": "GBP", "amount": 1}, "info": {"quote": 0.79}, "result": 0.79},
        ]);
        let chart = comparison(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["Bitcoin", "USD/EUR", "USD/GBP"]);
        assert_eq!(chart.data.datasets[0].data, vec![92265.0, 0.92, 0.79]);
        assert_eq!(chart.title(), Some("Currency Exchange Rate Comparison"));
        assert_eq!(chart.options["plugins"]["tooltip"]["callbacks"]["decimals"], 4);
    }

    #[test]
    fn test_comparison_label_with_to_stays_crypto() {
        let input = json!([{"photon": {"usd": 1.5}}, {"toncoin": {"usd": 5.2}}]);
        let chart = comparison(&input).unwrap();
        assert_eq!(chart.title(), Some("Cryptocurrency Price Comparison"));
    }

    #[test]
    fn test_comparison_without_usable_items() {
        assert!(comparison(&json!([{"error": "x"}, "text"])).is_none());
    }

    #[test]
    fn test_series_skips_unusable_days() {
        let input = json!({
            "source": "EUR",
            "quotes": {"2024-01-01": {}, "2024-01-02": {"EURJPY": "160.5"}, "2024-01-03": {"EURJPY": 161.0}}
        });
        let chart = exchange_rate_series(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["2024-01-02", "2024-01-03"]);
        assert!(chart.title().unwrap().starts_with("EUR to JPY Exchange Rate"));
    }

    #[test]
    fn test_series_range_excludes_everything() {
        let input = json!({
            "source": "USD",
            "start_date": "2025-01-01",
            "end_date": "2025-01-31",
            "quotes": {"2024-01-01": {"USDEUR": 0.9}}
        });
        assert!(exchange_rate_series(&input).is_none());
    }

    #[test]
    fn test_series_single_bound_keeps_all_days() {
        let input = json!({
            "source": "USD",
            "start_date": "2024-01-02",
            "quotes": {"2024-01-01": {"USDEUR": 0.91}, "2024-01-02": {"USDEUR": 0.92}}
        });
        let chart = exchange_rate_series(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["2024-01-01", "2024-01-02"]);
    }

    #[test]
    fn test_dominance_at_top_level() {
        let input = json!({"market_cap_percentage": {"btc": 50.0, "usdt": "4.1", "bad": null}});
        let chart = market_dominance(&input).unwrap();
        assert_eq!(chart.data.labels, vec!["BTC", "USDT"]);
    }
}
