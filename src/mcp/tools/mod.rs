//! MCP Tool Registry and Implementations
//!
//! Each tool validates its JSON arguments and delegates to the service layer,
//! so the MCP surface and the CLI render the same text.

pub mod curl;
pub mod list_commands;
pub mod resources;
pub mod run_command;

use crate::services::Dispatcher;
use crate::store::{DocumentStore, PromptWriter};
use crate::Result;
use serde_json::{json, Value};
use std::time::Duration;

/// Registry of available MCP tools
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

/// Tool definition for MCP protocol
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Shared state handed to every tool call
pub struct ToolContext<S> {
    pub dispatcher: Dispatcher<S>,
    /// Default timeout for the curl tool
    pub curl_timeout: Duration,
}

impl<S: DocumentStore + PromptWriter> ToolContext<S> {
    pub fn new(store: S, curl_timeout: Duration) -> Self {
        Self {
            dispatcher: Dispatcher::new(store),
            curl_timeout,
        }
    }
}

impl ToolRegistry {
    /// Create a new tool registry with all available tools
    pub fn new() -> Self {
        Self {
            tools: vec![
                run_command::definition(),
                list_commands::definition(),
                resources::read_definition(),
                resources::list_definition(),
                curl::definition(),
            ],
        }
    }

    /// List all available tools in MCP format
    pub fn list_tools(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name with the given arguments
    pub async fn call_tool<S: DocumentStore + PromptWriter>(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &ToolContext<S>,
    ) -> Result<String> {
        match name {
            "run_pal_command" => run_command::execute(arguments, ctx),
            "list_pal_commands" => list_commands::execute(arguments, ctx),
            "read_pal_resource" => resources::execute_read(arguments, ctx),
            "list_pal_resources" => resources::execute_list(arguments, ctx),
            "curl" => curl::execute(arguments, ctx).await,
            _ => anyhow::bail!("Unknown tool: {}", name),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to extract a required string field from JSON
pub fn get_required_string(args: &Value, field: &str) -> Result<String> {
    args.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required field: {}", field))
}

/// Helper to extract an optional string field from JSON
pub fn get_optional_string(args: &Value, field: &str) -> Option<String> {
    args.get(field).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Helper to extract an optional non-negative integer field from JSON
pub fn get_optional_u64(args: &Value, field: &str) -> Result<Option<u64>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("Field '{}' must be a non-negative integer", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::store::MemoryStore;

    fn ctx() -> ToolContext<MemoryStore> {
        ToolContext::new(
            MemoryStore::new().with(Tier::Bundled, "review", "Review the diff."),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_registry_lists_all_tools() {
        let names: Vec<String> = ToolRegistry::new()
            .list_tools()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "run_pal_command",
                "list_pal_commands",
                "read_pal_resource",
                "list_pal_resources",
                "curl"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = ToolRegistry::new()
            .call_tool("nope", &json!({}), &ctx())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: nope");
    }

    #[test]
    fn test_optional_u64() {
        let args = json!({"timeout": 10, "bad": "x"});
        assert_eq!(get_optional_u64(&args, "timeout").unwrap(), Some(10));
        assert_eq!(get_optional_u64(&args, "missing").unwrap(), None);
        assert!(get_optional_u64(&args, "bad").is_err());
    }
}
