//! read_pal_resource / list_pal_resources MCP Tools

use super::{get_required_string, ToolContext, ToolDefinition};
use crate::services::{list_resources, read_resource};
use crate::store::{DocumentStore, PromptWriter};
use crate::Result;
use serde_json::{json, Value};

/// Get the tool definition for read_pal_resource
pub fn read_definition() -> ToolDefinition {
    ToolDefinition {
        name: "read_pal_resource".to_string(),
        description: "Read a PAL resource: pal://instructions/<path>.md or pal://prompts/<name>.md"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["uri"],
            "properties": {
                "uri": {
                    "type": "string",
                    "description": "Resource URI, e.g. 'pal://instructions/git/commit.md'"
                }
            }
        }),
    }
}

/// Execute the read_pal_resource tool
pub fn execute_read<S: DocumentStore + PromptWriter>(
    args: &Value,
    ctx: &ToolContext<S>,
) -> Result<String> {
    let uri = get_required_string(args, "uri")?;
    read_resource(ctx.dispatcher.resolver(), &uri)
}

/// Get the tool definition for list_pal_resources
pub fn list_definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_pal_resources".to_string(),
        description: "List PAL instruction and custom prompt resources".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Execute the list_pal_resources tool
pub fn execute_list<S: DocumentStore + PromptWriter>(
    _args: &Value,
    ctx: &ToolContext<S>,
) -> Result<String> {
    let resources = list_resources(ctx.dispatcher.resolver())?;
    if resources.is_empty() {
        return Ok("No resources found.".to_string());
    }

    let mut result = String::from("# PAL Resources\n\n");
    for resource in &resources {
        result.push_str(&format!("- `{}` ({})", resource.uri, resource.name));
        if let Some(description) = &resource.description {
            result.push_str(&format!(": {}", description));
        }
        result.push('\n');
    }
    result.push_str(&format!("\nTotal: {} resource(s)", resources.len()));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn ctx() -> ToolContext<MemoryStore> {
        ToolContext::new(
            MemoryStore::new()
                .with(Tier::Bundled, "review", "Review the diff.")
                .with(Tier::Custom, "tr", "Translate."),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_list_resources_markdown() {
        let text = execute_list(&json!({}), &ctx()).unwrap();
        assert_eq!(
            text,
            "# PAL Resources\n\n\
             - `pal://instructions/review.md` (review): Review the diff.\n\
             - `pal://prompts/tr.md` (tr)\n\
             \nTotal: 2 resource(s)"
        );
    }

    #[test]
    fn test_read_resource_by_uri() {
        let text = execute_read(&json!({"uri": "pal://prompts/tr.md"}), &ctx()).unwrap();
        assert_eq!(text, "Translate.");
        assert!(execute_read(&json!({}), &ctx()).is_err());
    }
}
