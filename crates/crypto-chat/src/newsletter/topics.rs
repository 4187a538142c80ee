//! Newsletter topic taxonomy

/// A subscribable topic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topic {
    pub id: &'static str,
    pub display_name: &'static str,
    /// CryptoPanic currency filter
    pub currency: Option<&'static str>,
    /// Title filter for CryptoPanic posts
    pub query: &'static str,
}

const fn topic(
    id: &'static str,
    display_name: &'static str,
    currency: Option<&'static str>,
    query: &'static str,
) -> Topic {
    Topic {
        id,
        display_name,
        currency,
        query,
    }
}

pub const TOPICS: [Topic; 14] = [
    topic("bitcoin", "₿ Bitcoin", Some("BTC"), "Bitcoin"),
    topic("ethereum", "Ξ Ethereum", Some("ETH"), "Ethereum"),
    topic("altcoins", "🪙 Altcoins", None, "altcoin"),
    topic("defi", "🏦 DeFi", None, "DeFi"),
    topic("trading", "📈 Trading", None, "trading"),
    topic("mining", "⛏️ Mining", Some("BTC"), "mining"),
    topic("regulation", "⚖️ Regulation", None, "regulation"),
    topic("market-analysis", "📊 Market Analysis", None, "market"),
    topic("nft-cryptopunks", "🎭 CryptoPunks", None, "CryptoPunks"),
    topic("nft-bored-ape", "🦍 Bored Ape YC", None, "Bored Ape"),
    topic("nft-art", "🎨 NFT Art", None, "NFT art"),
    topic("nft-gaming", "🎮 NFT Gaming", None, "NFT gaming"),
    topic("nft-marketplace", "🏪 NFT Marketplaces", None, "NFT marketplace"),
    topic("nft-metaverse", "🌐 Metaverse", None, "metaverse"),
];

pub fn find(id: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.id == id)
}

/// Display name, or the id itself for unknown topics
pub fn display_name(id: &str) -> &str {
    find(id).map_or(id, |t| t.display_name)
}

/// Known topic ids
pub fn ids() -> impl Iterator<Item = &'static str> {
    TOPICS.iter().map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mining = find("mining").unwrap();
        assert_eq!(mining.currency, Some("BTC"));
        assert_eq!(mining.query, "mining");
        assert!(find("dogs").is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(display_name("nft-bored-ape"), "🦍 Bored Ape YC");
        assert_eq!(display_name("custom"), "custom");
    }

    #[test]
    fn test_ids_unique() {
        let mut ids: Vec<&str> = ids().collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TOPICS.len());
    }
}
