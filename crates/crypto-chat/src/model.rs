//! Domain Models
//!
//! Reference-list entries, resolution results, news and subscriber records.

use serde::{Deserialize, Serialize};

/// One entry of the coin reference list (`coins.json`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinEntry {
    /// CoinGecko id, e.g. `bitcoin`
    pub id: String,
    /// Ticker, e.g. `btc`
    pub symbol: String,
    /// Display name, e.g. `Bitcoin`
    pub name: String,
}

impl CoinEntry {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// One entry of the NFT collection list (`nft.json`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl NftEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.map(str::to_string),
        }
    }
}

/// What a free-text token refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Crypto,
    Nft,
    Unknown,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Nft => "nft",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category plus the identifier the downstream API expects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentifier {
    pub category: Category,
    pub id: Option<String>,
}

/// Source attribution of a news article
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub title: String,
    #[serde(default)]
    pub domain: String,
}

/// A newsletter article (CryptoPanic post, normalized)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub published_at: String,
    pub source: NewsSource,
}

/// Up/down votes on a news item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// An item of the `/news` feed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: serde_json::Value,
    pub title: String,
    pub description: String,
    pub source: String,
    pub url: String,
    pub imageurl: String,
    pub published_at: serde_json::Value,
    pub tags: String,
    pub categories: Vec<String>,
    pub votes: Votes,
    pub lang: String,
}

/// A newsletter subscriber
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub name: String,
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed_date: Option<String>,
}

/// Split a comma-separated topic attribute
pub fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
