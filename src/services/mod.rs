//! Service layer for pal
//!
//! Business logic shared between MCP tools and CLI commands, so both surfaces
//! render commands, prompts and resources the same way.

pub mod curl_service;
pub mod dispatch_service;
pub mod prompt_service;
pub mod resource_service;

// Re-export commonly used types
pub use curl_service::{execute_curl, CurlResult};
pub use dispatch_service::{
    DispatchContext, DispatchOutput, Dispatcher, StageReport, StageStatus, BUILTIN_COMMANDS,
    STAGE_SEPARATOR,
};
pub use prompt_service::{list_custom_prompts, save_custom_prompt, show_custom_prompt};
pub use resource_service::{list_resources, read_resource, ResourceInfo};
