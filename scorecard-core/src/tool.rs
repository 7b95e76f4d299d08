//! Function tools the hosted agent can call back into
//!
//! A [`FunctionTool`] is a plain async callable with a JSON-schema
//! description of its arguments. Tools are collected into a [`ToolSet`],
//! which produces the definitions sent when an agent is created and
//! dispatches the calls the agent requests during a run.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Trait for callbacks exposed to the hosted agent
#[async_trait]
pub trait FunctionTool: Send + Sync {
    /// Name the agent uses to call this tool
    fn name(&self) -> &'static str;

    /// Human readable description shown to the model
    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;

    /// Invoke the tool with already-parsed arguments
    async fn call(&self, arguments: Value) -> Result<Value>;
}

/// Function definition as registered with the agent service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Always `"function"`
    #[serde(rename = "type")]
    pub kind: String,

    /// The function signature
    pub function: FunctionDefinition,
}

/// Name, description and parameter schema of a function tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Build the definition for a tool
    pub fn of(tool: &dyn FunctionTool) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            },
        }
    }
}

/// Registry of function tools, keyed by name
#[derive(Default)]
pub struct ToolSet {
    tools: BTreeMap<String, Box<dyn FunctionTool>>,
}

impl ToolSet {
    /// Create a new empty tool set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Box<dyn FunctionTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Register a tool (builder pattern)
    pub fn with(mut self, tool: Box<dyn FunctionTool>) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn FunctionTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions for every registered tool
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| ToolDefinition::of(t.as_ref())).collect()
    }

    /// Call a tool with raw JSON arguments
    pub async fn call(&self, name: &str, raw_arguments: &str) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::Tool(format!("Unknown tool: {}", name)))?;

        let arguments: Value = if raw_arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(raw_arguments)
                .map_err(|e| Error::Tool(format!("Invalid arguments for {}: {}", name, e)))?
        };

        debug!(tool = name, %arguments, "Calling function tool");
        tool.call(arguments).await
    }

    /// Call a tool and render its output as the string sent back to the agent
    ///
    /// A failing call aborts only this invocation: the error is reported to
    /// the agent as `{"error": "..."}` so the run can continue.
    pub async fn execute(&self, name: &str, raw_arguments: &str) -> String {
        match self.call(name, raw_arguments).await {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(tool = name, error = %e, "Function tool failed");
                json!({ "error": e.to_string() }).to_string()
            }
        }
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}

/// Read a required string argument
pub fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Tool(format!("Missing required string argument '{}'", key)))
}
