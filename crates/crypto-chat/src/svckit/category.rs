//! Category detection and the greeting utility

use async_trait::async_trait;
use serde_json::Value;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::data_result;
use crate::resolver::CategoryResolver;

/// Whether a name is a cryptocurrency, an NFT collection, or unknown
pub struct DetermineCategoryTool {
    resolver: CategoryResolver,
}

impl DetermineCategoryTool {
    pub const fn new(resolver: CategoryResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for DetermineCategoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "determine_category".into(),
            description: "**USE THIS FIRST** to determine if a name is 'crypto', 'nft', or 'unknown'. Returns the category type.".into(),
            parameters: vec![ParameterSchema::string("name", "Coin or collection name, symbol or id")],
            category: Some("resolution".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let name = call.required_str("name")?;
        let category = self.resolver.determine_category(name);
        tracing::debug!(name, %category, "Determined category");
        Ok(data_result("determine_category", Value::from(category.as_str())))
    }
}

/// Friendly greeting
pub struct GreetTool;

#[async_trait]
impl Tool for GreetTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "greet".into(),
            description: "Returns a greeting message for the given name.".into(),
            parameters: vec![ParameterSchema::string("name", "Name to greet")],
            category: Some("utility".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let name = call.required_str("name")?;
        Ok(data_result("greet", Value::from(format!("Hello, {name}!"))))
    }
}
