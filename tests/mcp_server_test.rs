//! Integration tests driving the MCP server over in-memory streams

use pal::mcp::McpServer;
use pal::FsStore;
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;

async fn call(server: &McpServer<FsStore>, requests: &[&str]) -> Vec<Value> {
    let input = requests.join("\n") + "\n";
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn server(temp_dir: &TempDir) -> McpServer<FsStore> {
    let user = temp_dir.path().join("prompts");
    McpServer::new(FsStore::new(&user, user.join("custom")), Duration::from_secs(5))
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_list_commands_tool() {
    let temp_dir = TempDir::new().unwrap();
    let responses = call(
        &server(&temp_dir),
        &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"list_pal_commands"}}"#],
    )
    .await;

    let listing = text(&responses[0]);
    assert!(listing.starts_with("Commands: curl, echo, git commit, help"));
    assert!(listing.contains("notes add"));
}

#[tokio::test]
async fn test_save_then_read_prompt_resource() {
    let temp_dir = TempDir::new().unwrap();
    let responses = call(
        &server(&temp_dir),
        &[
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"run_pal_command","arguments":{"command":"prompt shout Answer in capitals."}}}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"read_pal_resource","arguments":{"uri":"pal://prompts/shout.md"}}}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"read_pal_resource","arguments":{"uri":"pal://instructions/git/commit.md"}}}"#,
        ],
    )
    .await;

    assert!(text(&responses[0]).contains("Prompt 'shout' saved."));
    assert_eq!(text(&responses[1]), "Answer in capitals.");
    assert!(text(&responses[2]).starts_with("Create a git commit"));
}

#[tokio::test]
async fn test_unknown_resource_is_tool_error() {
    let temp_dir = TempDir::new().unwrap();
    let responses = call(
        &server(&temp_dir),
        &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"read_pal_resource","arguments":{"uri":"pal://instructions/nope.md"}}}"#],
    )
    .await;

    assert_eq!(responses[0]["result"]["isError"], true);
    assert!(text(&responses[0]).starts_with("Error: "));
}
