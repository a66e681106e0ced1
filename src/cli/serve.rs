use crate::config::Settings;
use crate::mcp::McpServer;
use crate::Result;

/// Serve MCP over stdio until stdin closes
pub async fn run(settings: &Settings) -> Result<()> {
    if let Err(e) = settings.ensure_directories() {
        tracing::warn!("prompt directories unavailable: {:#}", e);
    }
    McpServer::from_settings(settings).run().await
}
