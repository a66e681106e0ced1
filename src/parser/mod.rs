pub mod command_line;
pub mod frontmatter;
pub mod markdown;
pub mod tokens;

pub use command_line::{parse, Operator, Pipeline, PipelineStage};
pub use frontmatter::{calculate_checksum, normalize_content, split_frontmatter, Split};
pub use markdown::extract_description;
pub use tokens::{tokenize, Token};
