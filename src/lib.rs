// PAL - Prompt dispatch layer
// Resolves `$$command` lines to markdown instructions for MCP hosts

pub mod cli;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod services;
pub mod store;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use models::{CommandPath, PalError, PalResult, ResolvedPrompt, Tier};
pub use resolver::Resolver;
pub use services::{DispatchContext, DispatchOutput, Dispatcher};
pub use store::{DocumentStore, FsStore, MemoryStore};
