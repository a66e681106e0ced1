//! Resource service - `pal://` URIs over instructions and custom prompts

use serde::Serialize;

use crate::models::{CommandPath, Tier};
use crate::resolver::Resolver;
use crate::store::DocumentStore;
use crate::Result;

pub const INSTRUCTIONS_PREFIX: &str = "pal://instructions/";
pub const PROMPTS_PREFIX: &str = "pal://prompts/";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceInfo {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One resource per instruction document plus one per custom prompt
pub fn list_resources<S: DocumentStore>(resolver: &Resolver<S>) -> Result<Vec<ResourceInfo>> {
    let store = resolver.store();
    let mut instructions: Vec<CommandPath> = store.list(Tier::User)?;
    instructions.extend(store.list(Tier::Bundled)?);
    instructions.sort();
    instructions.dedup();

    let mut resources: Vec<ResourceInfo> = instructions
        .into_iter()
        .map(|path| ResourceInfo {
            uri: format!("{}{}", INSTRUCTIONS_PREFIX, path.storage_key()),
            description: resolver.describe(&path).ok().flatten(),
            name: path.to_string(),
        })
        .collect();

    resources.extend(store.list(Tier::Custom)?.into_iter().map(|path| ResourceInfo {
        uri: format!("{}{}", PROMPTS_PREFIX, path.storage_key()),
        name: path.segments().join("."),
        description: None,
    }));

    Ok(resources)
}

/// Read a resource by URI
pub fn read_resource<S: DocumentStore>(resolver: &Resolver<S>, uri: &str) -> Result<String> {
    if let Some(key) = uri.strip_prefix(INSTRUCTIONS_PREFIX) {
        let path = CommandPath::from_storage_key(key)?;
        let resolved = resolver.resolve(&path)?;
        if resolved.is_fallback() {
            anyhow::bail!("Resource not found: {}", uri);
        }
        return Ok(resolved.text);
    }

    if let Some(key) = uri.strip_prefix(PROMPTS_PREFIX) {
        let path = CommandPath::from_storage_key(key)?;
        return resolver
            .store()
            .get(Tier::Custom, &path)?
            .ok_or_else(|| anyhow::anyhow!("Resource not found: {}", uri));
    }

    anyhow::bail!("Unsupported resource URI: {}", uri)
}
