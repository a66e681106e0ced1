//! list_pal_commands MCP Tool

use super::{ToolContext, ToolDefinition};
use crate::store::{DocumentStore, PromptWriter};
use crate::Result;
use serde_json::{json, Value};

/// Get the tool definition for list_pal_commands
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_pal_commands".to_string(),
        description: "List all available PAL commands".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Execute the list_pal_commands tool
pub fn execute<S: DocumentStore + PromptWriter>(
    _args: &Value,
    ctx: &ToolContext<S>,
) -> Result<String> {
    let commands = ctx.dispatcher.list_commands()?;
    Ok(format!("Commands: {}", commands.join(", ")))
}
