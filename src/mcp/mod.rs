//! MCP (Model Context Protocol) Server for PAL
//!
//! Serves the prompt catalog to an MCP host over stdio JSON-RPC.
//!
//! ## Tools
//! - `run_pal_command` - Run a `$$` command line and return its instructions
//! - `list_pal_commands` - List every available command
//! - `read_pal_resource` / `list_pal_resources` - Browse `pal://` resources
//! - `curl` - Issue an HTTP request through the server's curl binary

pub mod server;
pub mod tools;

pub use server::McpServer;
