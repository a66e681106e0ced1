//! Error taxonomy for prompt resolution and argument validation

use super::CommandPath;

/// Result type for resolver-level operations
pub type PalResult<T> = std::result::Result<T, PalError>;

/// Errors surfaced by the resolver, the argument validator and the stores
#[derive(Debug, thiserror::Error)]
pub enum PalError {
    #[error("Unknown command: {path}")]
    NotFound {
        path: CommandPath,
        /// Closest known commands, for "did you mean" output
        hints: Vec<String>,
    },

    #[error("Malformed frontmatter in {path}: {message}")]
    MalformedFrontmatter { path: String, message: String },

    #[error("Invalid argument '{field}': {message}")]
    ArgumentValidation { field: String, message: String },

    #[error("Invalid command path: {0}")]
    InvalidCommandPath(String),

    #[error("Failed to read prompt store: {0}")]
    Io(#[from] std::io::Error),
}

impl PalError {
    pub(crate) fn argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        PalError::ArgumentValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            PalError::ArgumentValidation { field, .. } => Some(field),
            _ => None,
        }
    }
}
