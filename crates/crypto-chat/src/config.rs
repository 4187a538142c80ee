//! Configuration
//!
//! Everything is read from the environment (a `.env` file is loaded by the
//! binaries). Missing keys fall back to the defaults below; API keys are
//! optional until the client that needs them is used.

use std::path::PathBuf;
use std::time::Duration;

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn flag(key: &str) -> bool {
    var(key).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

/// A REST endpoint with an optional credential
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// `base_url` joined with `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Weekly newsletter settings
#[derive(Clone, Debug)]
pub struct NewsletterConfig {
    pub brevo: ServiceConfig,
    pub list_id: u64,
    pub sender_name: String,
    pub sender_email: String,
    /// Link placed in the email footer
    pub chatbot_url: String,
    /// Articles per topic
    pub articles_per_topic: usize,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            brevo: ServiceConfig::new("https://api.brevo.com/v3", None),
            list_id: 2,
            sender_name: "Crypto Chatbot Newsletter".into(),
            sender_email: "newsletter@cryptochatbot.com".into(),
            chatbot_url: "http://localhost:3000".into(),
            articles_per_topic: 3,
        }
    }
}

impl NewsletterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            brevo: ServiceConfig::new(
                var_or("BREVO_BASE_URL", &defaults.brevo.base_url),
                var("BREVO_API_KEY"),
            ),
            list_id: parsed_or("BREVO_LIST_ID", defaults.list_id),
            sender_name: var_or("NEWSLETTER_SENDER_NAME", &defaults.sender_name),
            sender_email: var_or("NEWSLETTER_SENDER_EMAIL", &defaults.sender_email),
            chatbot_url: var_or("CHATBOT_URL", &defaults.chatbot_url),
            articles_per_topic: defaults.articles_per_topic,
        }
    }
}

/// Top-level chatbot configuration
#[derive(Clone, Debug)]
pub struct ChatbotConfig {
    pub coins_file: PathBuf,
    pub nfts_file: PathBuf,
    pub coingecko: ServiceConfig,
    pub exchangerate: ServiceConfig,
    pub cryptopanic: ServiceConfig,
    pub cryptocompare: ServiceConfig,
    pub newsletter: NewsletterConfig,
    pub http_timeout: Duration,
    /// Serve canned data instead of calling the data APIs
    pub offline: bool,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            coins_file: PathBuf::from("data/coins.json"),
            nfts_file: PathBuf::from("data/nft.json"),
            coingecko: ServiceConfig::new("https://api.coingecko.com/api/v3", None),
            exchangerate: ServiceConfig::new("https://api.exchangerate.host", None),
            cryptopanic: ServiceConfig::new("https://cryptopanic.com/api/v1", None),
            cryptocompare: ServiceConfig::new("https://min-api.cryptocompare.com", None),
            newsletter: NewsletterConfig::default(),
            http_timeout: Duration::from_secs(30),
            offline: false,
        }
    }
}

impl ChatbotConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            coins_file: var("COINS_FILE").map_or(defaults.coins_file, PathBuf::from),
            nfts_file: var("NFTS_FILE").map_or(defaults.nfts_file, PathBuf::from),
            coingecko: ServiceConfig::new(
                var_or("COINGECKO_BASE_URL", &defaults.coingecko.base_url),
                var("COINGECKO_API_KEY"),
            ),
            exchangerate: ServiceConfig::new(
                var_or("EXCHANGERATE_BASE_URL", &defaults.exchangerate.base_url),
                var("EXCHANGERATE_API_KEY"),
            ),
            cryptopanic: ServiceConfig::new(
                var_or("CRYPTOPANIC_BASE_URL", &defaults.cryptopanic.base_url),
                var("CRYPTOPANIC_API_KEY"),
            ),
            cryptocompare: ServiceConfig::new(
                var_or("CRYPTOCOMPARE_BASE_URL", &defaults.cryptocompare.base_url),
                var("CRYPTOCOMPARE_API_KEY"),
            ),
            newsletter: NewsletterConfig::from_env(),
            http_timeout: Duration::from_secs(parsed_or("HTTP_TIMEOUT_SECS", 30)),
            offline: flag("OFFLINE_MODE"),
        }
    }

    /// Shared HTTP client honouring the configured timeout
    pub fn http_client(&self) -> crate::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("crypto-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::ChatbotError::from)
    }
}
