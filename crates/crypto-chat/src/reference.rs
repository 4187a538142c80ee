//! Reference Data
//!
//! The coin and NFT lists, loaded once at startup and shared read-only.
//! A missing or malformed file is an error; there is no silent empty list.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{ChatbotError, Result};
use crate::model::{CoinEntry, NftEntry};

/// Immutable coin and NFT lists
#[derive(Clone, Debug, Default)]
pub struct ReferenceData {
    coins: Vec<CoinEntry>,
    nfts: Vec<NftEntry>,
}

impl ReferenceData {
    /// Load both lists from JSON array files.
    pub fn load(coins_path: impl AsRef<Path>, nfts_path: impl AsRef<Path>) -> Result<Self> {
        let coins: Vec<CoinEntry> = read_json_array(coins_path.as_ref())?;
        let nfts: Vec<NftEntry> = read_json_array(nfts_path.as_ref())?;
        tracing::info!(coins = coins.len(), nfts = nfts.len(), "Loaded reference data");
        Ok(Self { coins, nfts })
    }

    /// Build from in-memory entries
    pub const fn from_entries(coins: Vec<CoinEntry>, nfts: Vec<NftEntry>) -> Self {
        Self { coins, nfts }
    }

    pub fn coins(&self) -> &[CoinEntry] {
        &self.coins
    }

    pub fn nfts(&self) -> &[NftEntry] {
        &self.nfts
    }

    /// Up to `limit` NFT collections whose name or id contains `query`.
    pub fn search_nfts(&self, query: &str, limit: usize) -> Vec<&NftEntry> {
        let query = query.trim().to_lowercase();
        self.nfts
            .iter()
            .filter(|nft| nft.name.to_lowercase().contains(&query) || nft.id.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }

    /// Upper-case ticker for a coin given by exact id or name; the query
    /// itself, upper-cased, when no coin matches.
    pub fn symbol_for(&self, query: &str) -> String {
        let needle = query.trim().to_lowercase();
        self.coins
            .iter()
            .find(|coin| coin.id == needle || coin.name.to_lowercase() == needle)
            .map_or_else(|| query.trim().to_uppercase(), |coin| coin.symbol.to_uppercase())
    }
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let wrap = |source: Box<dyn std::error::Error + Send + Sync>| ChatbotError::ReferenceData {
        path: path.to_path_buf(),
        source,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| wrap(Box::new(e)))?;
    serde_json::from_str(&raw).map_err(|e| wrap(Box::new(e)))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("crypto-chat-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_files() {
        let coins = temp_file("coins.json", r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin"}]"#);
        let nfts = temp_file(
            "nft.json",
            r#"[{"id":"cryptopunks","contract_address":"0xb4","name":"CryptoPunks","asset_platform_id":"ethereum","symbol":"PUNK"}]"#,
        );
        let data = ReferenceData::load(&coins, &nfts).unwrap();
        assert_eq!(data.coins().len(), 1);
        assert_eq!(data.nfts()[0].symbol.as_deref(), Some("PUNK"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = ReferenceData::load("/nonexistent/coins.json", "/nonexistent/nft.json").unwrap_err();
        assert!(matches!(err, ChatbotError::ReferenceData { .. }));
        assert!(err.to_string().contains("/nonexistent/coins.json"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let coins = temp_file("bad-coins.json", r#"{"not": "an array"}"#);
        let nfts = temp_file("ok-nft.json", "[]");
        assert!(matches!(
            ReferenceData::load(&coins, &nfts),
            Err(ChatbotError::ReferenceData { .. })
        ));
    }

    #[test]
    fn test_search_nfts() {
        let data = fixtures::reference();
        let hits: Vec<&str> = data.search_nfts("Pudgy", 10).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(hits, vec!["pudgy-penguins", "lil-pudgys"]);
        assert_eq!(data.search_nfts("a", 2).len(), 2);
    }

    #[test]
    fn test_symbol_for() {
        let data = fixtures::reference();
        assert_eq!(data.symbol_for("Ethereum"), "ETH");
        assert_eq!(data.symbol_for("ripple"), "XRP");
        assert_eq!(data.symbol_for("sol"), "SOL");
    }
}
