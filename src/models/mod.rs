pub mod command;
pub mod error;
pub mod prompt;
pub mod schema;

pub use command::{CommandPath, Tier};
pub use error::{PalError, PalResult};
pub use prompt::{MergeStrategy, PromptDocument, PromptHeader, ResolvedPrompt};
pub use schema::{ArgType, ArgValue, ArgumentSchema, FlagSpec, ParsedArguments, RestSpec};
