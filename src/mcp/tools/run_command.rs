//! run_pal_command MCP Tool
//!
//! Runs a `$$` command line and returns the instruction text for the host.

use super::{get_optional_string, get_required_string, ToolContext, ToolDefinition};
use crate::services::DispatchContext;
use crate::store::{DocumentStore, PromptWriter};
use crate::Result;
use serde_json::{json, Value};

/// Get the tool definition for run_pal_command
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "run_pal_command".to_string(),
        description: "Execute a PAL command line ($$command [subcommand] [args]). \
                      Stages may be joined with |, && or ;. Returns instructions to follow."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["command"],
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command line, e.g. '$$git commit' or 'notes add -t work Standup notes'"
                },
                "msg": {
                    "type": "string",
                    "description": "Current user message, available as $MSG"
                },
                "reply": {
                    "type": "string",
                    "description": "Previous assistant reply, available as $REPLY"
                },
                "session": {
                    "type": "string",
                    "description": "Session id, available as $SESSION"
                }
            }
        }),
    }
}

/// Execute the run_pal_command tool
pub fn execute<S: DocumentStore + PromptWriter>(
    args: &Value,
    ctx: &ToolContext<S>,
) -> Result<String> {
    let command = get_required_string(args, "command")?;

    let mut context = DispatchContext::new();
    for (field, variable) in [("msg", "MSG"), ("reply", "REPLY"), ("session", "SESSION")] {
        if let Some(value) = get_optional_string(args, field) {
            context.set(variable, value);
        }
    }

    let output = ctx.dispatcher.run(&command, &context)?;
    Ok(output.text())
}
