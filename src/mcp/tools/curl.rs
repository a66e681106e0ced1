//! curl MCP Tool
//!
//! Lets the host issue HTTP requests through the server's curl binary.

use super::{get_optional_u64, get_required_string, ToolContext, ToolDefinition};
use crate::services::execute_curl;
use crate::Result;
use serde_json::{json, Value};
use std::time::Duration;

/// Get the tool definition for curl
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "curl".to_string(),
        description: "Execute a curl command on the server and return {success, output, error}"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["command"],
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Full curl command, e.g. 'curl -s http://localhost:7700/health'"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Timeout in seconds (defaults to the configured value)"
                }
            }
        }),
    }
}

/// Execute the curl tool
pub async fn execute<S>(args: &Value, ctx: &ToolContext<S>) -> Result<String> {
    let command = get_required_string(args, "command")?;
    let timeout = get_optional_u64(args, "timeout")?
        .map(Duration::from_secs)
        .unwrap_or(ctx.curl_timeout);

    let result = execute_curl(&command, timeout).await;
    Ok(serde_json::to_string(&result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_non_curl_command_reports_error() {
        let ctx = ToolContext::new(MemoryStore::new(), Duration::from_secs(5));
        let text = execute(&json!({"command": "wget http://example.com"}), &ctx)
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("Command must start with 'curl'"));
    }
}
