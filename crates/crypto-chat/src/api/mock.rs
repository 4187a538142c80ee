//! Mock Data API
//!
//! Static, realistic data for every data source. Backs offline mode and the
//! tests of everything built on top of the API traits.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde_json::{Map, Value, json};

use super::{FxRatesApi, MarketDataApi, NewsSearch, PostFilter, TopicNews};
use crate::error::{ChatbotError, Result};
use crate::model::{CoinEntry, NewsArticle, NewsItem, NewsSource, NftEntry, Votes};

const SERVICE: &str = "MockData";

/// (id, symbol, name, price in USD, 24h change %)
static COINS: [(&str, &str, &str, f64, f64); 8] = [
    ("bitcoin", "btc", "Bitcoin", 97_500.0, 2.5),
    ("ethereum", "eth", "Ethereum", 3_450.0, 1.8),
    ("solana", "sol", "Solana", 195.0, 4.2),
    ("cardano", "ada", "Cardano", 0.95, -1.2),
    ("ripple", "xrp", "XRP", 2.35, 0.9),
    ("dogecoin", "doge", "Dogecoin", 0.38, 12.0),
    ("litecoin", "ltc", "Litecoin", 105.0, 1.5),
    ("meebitstrategy", "meebit", "MeebitStrategy", 0.012, -3.4),
];

/// (id, name, symbol, floor in USD, floor in ETH)
static NFTS: [(&str, &str, &str, f64, f64); 4] = [
    ("cryptopunks", "CryptoPunks", "PUNK", 145_000.0, 42.0),
    ("bored-ape-yacht-club", "Bored Ape Yacht Club", "BAYC", 38_500.0, 11.2),
    ("azuki", "Azuki", "AZUKI", 9_800.0, 2.85),
    ("meebits", "Meebits", "⚇", 1_393.87, 0.41),
];

/// Units of each fiat currency per US dollar
static FIAT: [(&str, f64); 10] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 149.5),
    ("INR", 83.2),
    ("AUD", 1.53),
    ("CAD", 1.36),
    ("CHF", 0.88),
    ("CNY", 7.24),
    ("AFN", 70.5),
];

static HEADLINES: [(&str, &str); 6] = [
    ("Bitcoin climbs past resistance as ETF inflows grow", "BTC"),
    ("Ethereum developers schedule next network upgrade", "ETH"),
    ("DeFi lending volumes hit yearly high", "ETH"),
    ("Regulation roundup: new stablecoin rules proposed", "BTC"),
    ("CryptoPunks floor steadies after weekend sales", "ETH"),
    ("Bitcoin mining difficulty reaches record level", "BTC"),
];

/// Static stand-in for every data API
#[derive(Clone, Debug)]
pub struct MockDataApi {
    news_search_available: bool,
}

impl Default for MockDataApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataApi {
    pub const fn new() -> Self {
        Self {
            news_search_available: true,
        }
    }

    /// Make [`NewsSearch::latest`] fail as if rate limited
    #[must_use]
    pub const fn without_news_search(mut self) -> Self {
        self.news_search_available = false;
        self
    }

    fn coin_row(id: &str) -> Option<&'static (&'static str, &'static str, &'static str, f64, f64)> {
        COINS.iter().find(|(coin, ..)| *coin == id)
    }

    fn usd_rate(code: &str) -> Option<f64> {
        let code = code.to_uppercase();
        FIAT.iter().find(|(c, _)| *c == code).map(|(_, rate)| *rate)
    }

    fn not_found(what: &str) -> ChatbotError {
        ChatbotError::api(
            SERVICE,
            reqwest::StatusCode::NOT_FOUND,
            json!({ "error": format!("{what} not found") }).to_string(),
        )
    }
}

#[async_trait]
impl MarketDataApi for MockDataApi {
    async fn global(&self) -> Result<Value> {
        Ok(json!({"data": {
            "active_cryptocurrencies": 10_432,
            "markets": 1_187,
            "total_market_cap": {"usd": 3.17e12},
            "total_volume": {"usd": 1.12e11},
            "market_cap_percentage": {
                "btc": 56.8, "eth": 12.1, "usdt": 4.2, "xrp": 3.5, "bnb": 2.9, "sol": 2.6
            },
            "market_cap_change_percentage_24h_usd": 1.4
        }}))
    }

    async fn simple_price(&self, ids: &str, vs_currencies: &str) -> Result<Value> {
        let mut prices = Map::new();
        for id in ids.split(',').map(str::trim) {
            let Some((_, _, _, usd, _)) = Self::coin_row(id) else {
                continue;
            };
            let quotes: Map<String, Value> = vs_currencies
                .split(',')
                .filter_map(|vs| Some((vs.trim().to_lowercase(), json!(usd * Self::usd_rate(vs.trim())?))))
                .collect();
            prices.insert(id.to_string(), Value::Object(quotes));
        }
        Ok(Value::Object(prices))
    }

    async fn coin(&self, id: &str) -> Result<Value> {
        let (id, symbol, name, usd, _) = Self::coin_row(id).ok_or_else(|| Self::not_found("coin"))?;
        Ok(json!({
            "id": id,
            "symbol": symbol,
            "name": name,
            "market_cap_rank": COINS.iter().position(|(c, ..)| c == id).map(|i| i + 1),
            "description": {"en": format!("{name} is a digital asset.")},
            "links": {"homepage": [format!("https://{id}.org")]},
            "market_data": {"current_price": {"usd": usd}}
        }))
    }

    async fn coin_markets(&self, id: &str) -> Result<Value> {
        Ok(Value::Array(
            Self::coin_row(id)
                .map(|(id, symbol, name, usd, change)| {
                    json!({
                        "id": id,
                        "symbol": symbol,
                        "name": name,
                        "current_price": usd,
                        "market_cap": usd * 19_800_000.0,
                        "total_volume": usd * 450_000.0,
                        "price_change_percentage_24h": change,
                        "ath": usd * 1.1,
                        "atl": usd * 0.01
                    })
                })
                .into_iter()
                .collect(),
        ))
    }

    async fn search(&self, query: &str) -> Result<Value> {
        let needle = query.to_lowercase();
        let coins: Vec<Value> = COINS
            .iter()
            .filter(|(id, symbol, name, ..)| {
                id.contains(&needle) || *symbol == needle || name.to_lowercase().contains(&needle)
            })
            .map(|(id, symbol, name, ..)| json!({"id": id, "symbol": symbol.to_uppercase(), "name": name}))
            .collect();
        Ok(json!({"coins": coins, "exchanges": [], "nfts": []}))
    }

    async fn market_chart_range(&self, id: &str, vs_currency: &str, from: i64, to: i64) -> Result<Value> {
        let (_, _, _, usd, _) = Self::coin_row(id).ok_or_else(|| Self::not_found("coin"))?;
        let rate = Self::usd_rate(vs_currency).unwrap_or(1.0);
        let prices: Vec<Value> = (from..=to)
            .step_by(86_400)
            .enumerate()
            .map(|(day, ts)| {
                #[allow(clippy::cast_precision_loss)]
                let drift = 1.0 + (day % 7) as f64 * 0.01;
                json!([ts * 1000, usd * rate * drift])
            })
            .collect();
        Ok(json!({"prices": prices, "market_caps": [], "total_volumes": []}))
    }

    async fn nft(&self, id: &str) -> Result<Value> {
        let (id, name, symbol, usd, eth) = NFTS
            .iter()
            .find(|(nft, ..)| *nft == id)
            .ok_or_else(|| Self::not_found("nft"))?;
        Ok(json!({
            "id": id,
            "name": name,
            "symbol": symbol,
            "description": format!("{name} is an NFT collection on Ethereum."),
            "native_currency": "ethereum",
            "floor_price": {"usd": usd, "native_currency": eth},
            "market_cap": {"usd": usd * 10_000.0},
            "volume_24h": {"usd": usd * 12.0},
            "floor_price_24h_percentage_change": {"usd": -1.3},
            "total_supply": 10_000,
            "links": {"homepage": format!("https://{id}.io"), "twitter": format!("https://twitter.com/{id}")}
        }))
    }

    async fn trending(&self) -> Result<Value> {
        let coins: Vec<Value> = COINS
            .iter()
            .take(3)
            .enumerate()
            .map(|(rank, (id, symbol, name, ..))| {
                json!({"item": {"id": id, "symbol": symbol.to_uppercase(), "name": name, "score": rank}})
            })
            .collect();
        Ok(json!({"coins": coins, "nfts": [], "categories": []}))
    }

    async fn coins_list(&self) -> Result<Vec<CoinEntry>> {
        Ok(COINS
            .iter()
            .map(|(id, symbol, name, ..)| CoinEntry::new(*id, *symbol, *name))
            .collect())
    }

    async fn nfts_list(&self) -> Result<Vec<NftEntry>> {
        Ok(NFTS
            .iter()
            .map(|(id, name, symbol, ..)| NftEntry::new(*id, *name, Some(*symbol)))
            .collect())
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[async_trait]
impl FxRatesApi for MockDataApi {
    async fn convert(&self, from: &str, to: &str, amount: f64) -> Result<Value> {
        let (Some(from_usd), Some(to_usd)) = (Self::usd_rate(from), Self::usd_rate(to)) else {
            return Err(Self::not_found("currency"));
        };
        let rate = to_usd / from_usd;
        Ok(json!({
            "success": true,
            "query": {"from": from.to_uppercase(), "to": to.to_uppercase(), "amount": amount},
            "info": {"quote": rate},
            "result": rate * amount
        }))
    }

    async fn timeframe(&self, source: &str, currencies: &str, start_date: &str, end_date: &str) -> Result<Value> {
        let parse = |date: &str| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| ChatbotError::InvalidInput(format!("invalid date {date:?}: {e}")))
        };
        let (start, end) = (parse(start_date)?, parse(end_date)?);
        let source = source.to_uppercase();
        let base = Self::usd_rate(&source).ok_or_else(|| Self::not_found("currency"))?;

        let mut quotes = Map::new();
        let mut day = start;
        let mut offset = 0_u32;
        while day <= end {
            let rates: Map<String, Value> = currencies
                .split(',')
                .filter_map(|code| {
                    let code = code.trim().to_uppercase();
                    let rate = Self::usd_rate(&code)? / base * (1.0 + f64::from(offset % 5) * 0.002);
                    Some((format!("{source}{code}"), json!(rate)))
                })
                .collect();
            quotes.insert(day.format("%Y-%m-%d").to_string(), Value::Object(rates));
            let Some(next) = day.checked_add_days(Days::new(1)) else {
                break;
            };
            day = next;
            offset += 1;
        }
        Ok(json!({
            "success": true,
            "timeframe": true,
            "start_date": start_date,
            "end_date": end_date,
            "source": source,
            "quotes": quotes
        }))
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[async_trait]
impl TopicNews for MockDataApi {
    async fn posts(&self, _filter: PostFilter, currencies: Option<&str>) -> Result<Vec<NewsArticle>> {
        Ok(HEADLINES
            .iter()
            .enumerate()
            .filter(|(_, (_, code))| currencies.is_none_or(|c| c.split(',').any(|c| c.trim() == *code)))
            .map(|(i, (title, _))| NewsArticle {
                id: (1000 + i).to_string(),
                title: (*title).to_string(),
                url: format!("https://news.example.com/{}", 1000 + i),
                published_at: "2025-01-06T09:00:00Z".into(),
                source: NewsSource {
                    title: "Example News".into(),
                    domain: "news.example.com".into(),
                },
            })
            .collect())
    }
}

#[async_trait]
impl NewsSearch for MockDataApi {
    async fn latest(&self, category: Option<&str>) -> Result<Vec<NewsItem>> {
        if !self.news_search_available {
            return Err(ChatbotError::api(
                SERVICE,
                reqwest::StatusCode::TOO_MANY_REQUESTS,
                "rate limited",
            ));
        }
        Ok(HEADLINES
            .iter()
            .enumerate()
            .filter(|(_, (_, code))| category.is_none_or(|c| c.eq_ignore_ascii_case(code)))
            .map(|(i, (title, code))| NewsItem {
                id: json!((2000 + i).to_string()),
                title: (*title).to_string(),
                description: format!("{title}."),
                source: "Example News".into(),
                url: format!("https://news.example.com/{}", 2000 + i),
                imageurl: String::new(),
                published_at: json!(1_736_154_000),
                tags: String::new(),
                categories: vec![(*code).to_string()],
                votes: Votes::default(),
                lang: "EN".into(),
            })
            .collect())
    }
}
