//! Tool System
//!
//! Extensible tool framework for agent capabilities.
//! Tools are registered at startup, advertised to the LLM in registration
//! order and invoked with arguments bound from parsed `FUNCTION_CALL:` lines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::call::ParsedCall;
use crate::error::{AgentError, Result};

/// Tool call request, after argument binding
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier (canonical, aliases resolved)
    pub name: String,

    /// Arguments as key-value pairs
    pub arguments: HashMap<String, Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
            id: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// String argument, if present and a string
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    /// String argument that must be present
    pub fn required_str(&self, key: &str) -> Result<&str> {
        self.str_arg(key)
            .ok_or_else(|| AgentError::ToolValidation(format!("Missing {key}")))
    }

    /// Numeric argument; numeric strings are accepted
    pub fn f64_arg(&self, key: &str) -> Option<f64> {
        match self.arguments.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,

    /// Structured data (raw API body for data tools)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            data: None,
        }
    }

    /// Failure whose payload is `{"error": message}`, the shape every
    /// downstream consumer treats as a failed lookup.
    pub fn error_payload(name: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self::failure(name, error.clone()).with_data(serde_json::json!({ "error": error }))
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The payload handed to summarizers and charts: the structured data,
    /// or an error object built from the output text.
    pub fn payload(&self) -> Value {
        self.data.clone().unwrap_or_else(|| {
            if self.success {
                Value::String(self.output.clone())
            } else {
                serde_json::json!({ "error": self.output })
            }
        })
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterSchema {
    /// Required string parameter
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// Required numeric parameter
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: "number".into(),
            ..Self::string(name, description)
        }
    }

    /// Make the parameter optional with a default
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.param_type.as_str() {
            "string" => value.is_string(),
            "number" => {
                value.is_number()
                    || value.as_str().is_some_and(|s| s.trim().parse::<f64>().is_ok())
            }
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            _ => true,
        }
    }

    fn signature(&self) -> String {
        match &self.default {
            Some(Value::String(s)) => format!("{}=\"{s}\"", self.name),
            Some(other) => format!("{}={other}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions, in positional order
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,
}

impl ToolSchema {
    /// `name(param, param="default")` as written in the planning prompt
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParameterSchema::signature).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            match call.arguments.get(&param.name) {
                None if param.required => {
                    return Err(AgentError::ToolValidation(format!(
                        "{}() missing required argument: '{}'",
                        schema.name, param.name
                    )));
                }
                Some(value) if !param.accepts(value) => {
                    return Err(AgentError::ToolValidation(format!(
                        "{}() argument '{}' must be a {}",
                        schema.name, param.name, param.param_type
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Registry for available tools
///
/// Keeps registration order, which is the order tools are listed to the LLM.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a new tool. A tool with the same name replaces the old one.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if let Some(&slot) = self.index.get(&name) {
            self.tools[slot] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Accept `alias` as another name for an already registered tool
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> Result<()> {
        let slot = *self
            .index
            .get(target)
            .ok_or_else(|| AgentError::ToolNotFound(target.to_string()))?;
        self.index.insert(alias.into(), slot);
        Ok(())
    }

    /// Get a tool by name or alias
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| Arc::clone(&self.tools[slot]))
    }

    /// Bind a parsed call to a tool's parameter list.
    ///
    /// Positional arguments fill parameters in order, keyword arguments fill
    /// by name, defaults fill the rest. Extra, duplicate, unknown, missing
    /// and mistyped arguments are rejected.
    pub fn bind(&self, parsed: &ParsedCall) -> Result<ToolCall> {
        let tool = self
            .get(&parsed.name)
            .ok_or_else(|| AgentError::ToolNotFound(parsed.name.clone()))?;
        let schema = tool.schema();

        let mut arguments = HashMap::new();
        let mut seen_keyword = false;
        for (position, arg) in parsed.args.iter().enumerate() {
            let param = match &arg.name {
                Some(key) => {
                    seen_keyword = true;
                    schema.parameters.iter().find(|p| &p.name == key).ok_or_else(|| {
                        AgentError::ToolValidation(format!(
                            "{}() got an unexpected keyword argument '{key}'",
                            schema.name
                        ))
                    })?
                }
                None if seen_keyword => {
                    return Err(AgentError::ToolValidation(
                        "positional argument follows keyword argument".into(),
                    ));
                }
                None => schema.parameters.get(position).ok_or_else(|| {
                    AgentError::ToolValidation(format!(
                        "{}() takes {} arguments but {} were given",
                        schema.name,
                        schema.parameters.len(),
                        parsed.args.len()
                    ))
                })?,
            };

            if arguments.insert(param.name.clone(), arg.value.clone()).is_some() {
                return Err(AgentError::ToolValidation(format!(
                    "{}() got multiple values for argument '{}'",
                    schema.name, param.name
                )));
            }
        }

        for param in &schema.parameters {
            if let (false, Some(default)) = (arguments.contains_key(&param.name), &param.default) {
                arguments.insert(param.name.clone(), default.clone());
            }
        }

        let call = ToolCall {
            name: schema.name,
            arguments,
            id: Some(uuid::Uuid::new_v4().to_string()),
        };
        tool.validate(&call)?;
        Ok(call)
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;

        let mut result = tool.execute(call).await?;
        if result.id.is_none() {
            result.id.clone_from(&call.id);
        }
        Ok(result)
    }

    /// Get all tool schemas, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Get canonical tool names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.schema().name).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Numbered function list for the planning prompt
    pub fn generate_prompt_section(&self) -> String {
        let mut section = String::new();
        for (i, schema) in self.schemas().iter().enumerate() {
            let _ = writeln!(
                section,
                "{}. {} - {}",
                i + 1,
                schema.signature(),
                schema.description
            );
        }
        section
    }
}
