//! Document stores backing the resolver
//!
//! A store maps `(tier, path)` to raw markdown. The filesystem store serves
//! real installations; the memory store serves tests and embedding.

pub mod bundled;
pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use crate::models::{CommandPath, PalResult, Tier};

/// Read capability consumed by the resolver
pub trait DocumentStore: Send + Sync {
    /// Raw document text at `path` in `tier`, `None` when absent
    fn get(&self, tier: Tier, path: &CommandPath) -> PalResult<Option<String>>;

    /// Every document path present in `tier`, sorted
    fn list(&self, tier: Tier) -> PalResult<Vec<CommandPath>>;
}

/// Write capability used to save custom prompts
pub trait PromptWriter {
    /// Persist a document, returning where it was written
    fn save(&self, tier: Tier, path: &CommandPath, content: &str) -> PalResult<String>;

    /// Where a document lives or would live, for display
    fn location(&self, tier: Tier, path: &CommandPath) -> String;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn get(&self, tier: Tier, path: &CommandPath) -> PalResult<Option<String>> {
        (**self).get(tier, path)
    }

    fn list(&self, tier: Tier) -> PalResult<Vec<CommandPath>> {
        (**self).list(tier)
    }
}

impl<S: PromptWriter + ?Sized> PromptWriter for Arc<S> {
    fn save(&self, tier: Tier, path: &CommandPath, content: &str) -> PalResult<String> {
        (**self).save(tier, path, content)
    }

    fn location(&self, tier: Tier, path: &CommandPath) -> String {
        (**self).location(tier, path)
    }
}
