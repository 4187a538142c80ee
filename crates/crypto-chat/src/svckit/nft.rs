//! NFT collection tools

use async_trait::async_trait;
use serde_json::Value;

use agent_core::{AgentError, ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{DataSources, data_result};
use crate::resolver::CategoryResolver;

const CATEGORY: &str = "nft";
const SEARCH_LIMIT: usize = 10;

/// Collection details (floor price, market cap, volume)
pub struct NftInfoTool {
    sources: DataSources,
}

impl NftInfoTool {
    pub const fn new(sources: DataSources) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Tool for NftInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_nft_info".into(),
            description: "Get detailed information about a specific NFT collection from CoinGecko. The system will automatically resolve NFT names to IDs (e.g., \"CryptoPunks\", \"Bored Ape\", \"Azuki\").".into(),
            parameters: vec![ParameterSchema::string("nft_name", "Collection name, symbol or id")],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let name = call.required_str("nft_name")?;
        let id = self.sources.resolver.find_nft_id(name).ok_or_else(|| {
            AgentError::ToolExecution(format!(
                "{name:?} is a cryptocurrency, not an NFT collection; use get_coin_price or get_coin_info"
            ))
        })?;
        tracing::debug!(name, %id, "Fetching NFT collection");
        Ok(data_result("get_nft_info", self.sources.market.nft(&id).await?))
    }
}

/// Local search over the collection list
pub struct NftSearchTool {
    resolver: CategoryResolver,
}

impl NftSearchTool {
    pub const fn new(resolver: CategoryResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for NftSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_nft".into(),
            description: "Search for NFT collections by name or keyword. Returns up to 10 matching NFT collections.".into(),
            parameters: vec![ParameterSchema::string("query", "Name or keyword")],
            category: Some(CATEGORY.into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.required_str("query")?;
        let hits = self.resolver.data().search_nfts(query, SEARCH_LIMIT);
        Ok(data_result("search_nft", serde_json::to_value(hits)?))
    }
}
