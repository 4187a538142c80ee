//! Category Resolver
//!
//! Decides whether free text names a cryptocurrency or an NFT collection
//! and maps it to the identifier CoinGecko expects. Every function here is
//! a pure function of the input text and the reference lists.
//!
//! Matching is case-insensitive and whitespace-trimmed. Within each step the
//! first entry in list order wins. Text that matches nothing is passed
//! through lower-cased; the API call that follows decides whether it exists.

use std::sync::Arc;

use crate::model::{Category, ResolvedIdentifier};
use crate::reference::ReferenceData;

/// Names that are always NFT collections, checked before the NFT list.
const NFT_KEYWORDS: &[&str] = &[
    "cryptopunk",
    "cryptopunks",
    "bored ape",
    "bayc",
    "mutant ape",
    "mayc",
    "azuki",
    "clone x",
    "clonex",
    "doodle",
    "doodles",
    "moonbird",
    "moonbirds",
    "pudgy penguin",
    "pudgy penguins",
    "art blocks",
    "world of women",
    "wow",
    "meebit",
    "meebits",
];

/// Substrings that tip a name matching both lists towards NFT.
const NFT_INDICATORS: &[&str] = &["punk", "ape", "yacht", "mutant", "bored", "doodle", "moonbird"];

/// Popular collection nicknames mapped to CoinGecko NFT ids.
const NFT_ALIASES: &[(&str, &str)] = &[
    ("cryptopunk", "cryptopunks"),
    ("bored ape", "bored-ape-yacht-club"),
    ("bayc", "bored-ape-yacht-club"),
    ("mutant ape", "mutant-ape-yacht-club"),
    ("mayc", "mutant-ape-yacht-club"),
    ("clone x", "clonex"),
    ("meebit", "meebits"),
    ("doodle", "doodles-official"),
    ("moonbird", "proof-moonbirds"),
    ("pudgy penguin", "pudgy-penguins"),
];

/// Fuzzy NFT matching is skipped below this length.
const MIN_FUZZY_LEN: usize = 5;

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Category resolution over shared reference lists
#[derive(Clone, Debug)]
pub struct CategoryResolver {
    data: Arc<ReferenceData>,
}

impl CategoryResolver {
    pub const fn new(data: Arc<ReferenceData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    /// Exact id, symbol or name match in the coin list.
    pub fn is_cryptocurrency(&self, text: &str) -> bool {
        let needle = normalize(text);
        self.data.coins().iter().any(|coin| {
            coin.id.to_lowercase() == needle
                || coin.symbol.to_lowercase() == needle
                || coin.name.to_lowercase() == needle
        })
    }

    /// Curated keyword, or exact id or name match in the NFT list.
    pub fn is_nft(&self, text: &str) -> bool {
        let needle = normalize(text);
        NFT_KEYWORDS.contains(&needle.as_str())
            || self
                .data
                .nfts()
                .iter()
                .any(|nft| nft.id.to_lowercase() == needle || nft.name.to_lowercase() == needle)
    }

    /// `nft`, `crypto` or `unknown`.
    ///
    /// NFT detection wins, except when the text is also an exact coin id or
    /// name and carries none of the NFT indicator substrings; that case is
    /// classified `crypto`.
    pub fn determine_category(&self, text: &str) -> Category {
        if self.is_nft(text) {
            let needle = normalize(text);
            let exact_coin = self
                .data
                .coins()
                .iter()
                .any(|coin| coin.id.to_lowercase() == needle || coin.name.to_lowercase() == needle);

            if exact_coin && !NFT_INDICATORS.iter().any(|ind| needle.contains(ind)) {
                return Category::Crypto;
            }
            return Category::Nft;
        }

        if self.is_cryptocurrency(text) {
            Category::Crypto
        } else {
            Category::Unknown
        }
    }

    /// Coin id by exact id, exact symbol, exact name, then substring of a
    /// name or symbol. Falls back to the lower-cased input.
    pub fn find_coin_id(&self, text: &str) -> String {
        let needle = normalize(text);
        let coins = self.data.coins();

        coins
            .iter()
            .find(|c| c.id.to_lowercase() == needle)
            .or_else(|| coins.iter().find(|c| c.symbol.to_lowercase() == needle))
            .or_else(|| coins.iter().find(|c| c.name.to_lowercase() == needle))
            .or_else(|| {
                coins.iter().find(|c| {
                    c.name.to_lowercase().contains(&needle) || c.symbol.to_lowercase().contains(&needle)
                })
            })
            .map_or(needle.clone(), |c| c.id.clone())
    }

    /// NFT collection id, or `None` when the text names a cryptocurrency.
    ///
    /// Aliases apply first, then exact id, exact name, exact symbol,
    /// substring of a name and a singular/plural variant. The last two only
    /// run for text of at least five characters. Falls back to the aliased,
    /// lower-cased input.
    pub fn find_nft_id(&self, text: &str) -> Option<String> {
        if self.is_cryptocurrency(text) {
            return None;
        }

        let mut needle = normalize(text);
        if let Some((_, id)) = NFT_ALIASES.iter().find(|(alias, _)| *alias == needle) {
            needle = (*id).to_string();
        }

        let nfts = self.data.nfts();
        let exact = nfts
            .iter()
            .find(|n| n.id.to_lowercase() == needle)
            .or_else(|| nfts.iter().find(|n| n.name.to_lowercase() == needle))
            .or_else(|| {
                nfts.iter()
                    .find(|n| n.symbol.as_deref().is_some_and(|s| s.to_lowercase() == needle))
            });
        if let Some(nft) = exact {
            return Some(nft.id.clone());
        }

        if needle.chars().count() >= MIN_FUZZY_LEN {
            if let Some(nft) = nfts.iter().find(|n| n.name.to_lowercase().contains(&needle)) {
                return Some(nft.id.clone());
            }

            let plural = format!("{needle}s");
            let singular = needle.strip_suffix('s').map(str::to_string);
            for variant in std::iter::once(plural).chain(singular) {
                if let Some(nft) = nfts
                    .iter()
                    .find(|n| n.id.to_lowercase() == variant || n.name.to_lowercase() == variant)
                {
                    return Some(nft.id.clone());
                }
            }
        }

        Some(needle)
    }

    /// Category together with the matching identifier.
    pub fn resolve(&self, text: &str) -> ResolvedIdentifier {
        let category = self.determine_category(text);
        let id = match category {
            Category::Crypto => Some(self.find_coin_id(text)),
            Category::Nft => self.find_nft_id(text),
            Category::Unknown => None,
        };
        ResolvedIdentifier { category, id }
    }
}
