use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{DocumentStore, PromptWriter};
use crate::models::{CommandPath, PalError, PalResult, Tier};

type Documents = BTreeMap<(Tier, CommandPath), String>;

/// In-memory store, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tier: Tier, path: CommandPath, content: impl Into<String>) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((tier, path), content.into());
    }

    /// Builder form of [`MemoryStore::insert`]; panics on an invalid path
    pub fn with(self, tier: Tier, path: &str, content: impl Into<String>) -> Self {
        let path = CommandPath::parse(path).expect("valid command path");
        self.insert(tier, path, content);
        self
    }

    pub fn remove(&self, tier: Tier, path: &CommandPath) -> Option<String> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(tier, path.clone()))
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            documents: RwLock::new(documents),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, tier: Tier, path: &CommandPath) -> PalResult<Option<String>> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(tier, path.clone()))
            .cloned())
    }

    fn list(&self, tier: Tier) -> PalResult<Vec<CommandPath>> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(t, _)| *t == tier)
            .map(|(_, path)| path.clone())
            .collect())
    }
}

impl PromptWriter for MemoryStore {
    fn save(&self, tier: Tier, path: &CommandPath, content: &str) -> PalResult<String> {
        if tier == Tier::Bundled {
            return Err(PalError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "the bundled tier is read-only",
            )));
        }
        self.insert(tier, path.clone(), content);
        Ok(self.location(tier, path))
    }

    fn location(&self, tier: Tier, path: &CommandPath) -> String {
        format!("memory:{}/{}", tier, path.storage_key())
    }
}
