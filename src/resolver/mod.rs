//! Prompt Resolver: three-tier lookup with merge strategies
//!
//! A command path resolves to the first tier holding a document at the exact
//! path (`user`, then `bundled`, then `custom`). A user document may ask to be
//! combined with its bundled counterpart through `merge_strategy`. Only when no
//! tier holds the exact path does resolution fall back to the parent command.

use std::collections::BTreeSet;

use crate::models::{
    CommandPath, MergeStrategy, PalError, PalResult, PromptDocument, ResolvedPrompt, Tier,
};
use crate::parser::{calculate_checksum, extract_description};
use crate::store::{bundled, DocumentStore};

/// Maximum number of "did you mean" hints attached to `NotFound`
pub const MAX_HINTS: usize = 5;

/// One entry of the help catalog
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: Option<String>,
    pub subcommands: Vec<String>,
}

pub struct Resolver<S> {
    store: S,
}

impl<S: DocumentStore> Resolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a command path to its final instruction text
    pub fn resolve(&self, path: &CommandPath) -> PalResult<ResolvedPrompt> {
        let mut candidate = path.clone();
        loop {
            if let Some(resolved) = self.resolve_exact(path, &candidate)? {
                return Ok(resolved);
            }
            match candidate.parent() {
                Some(parent) => candidate = parent,
                None => break,
            }
        }

        tracing::debug!(path = %path, "no prompt document in any tier");
        Err(PalError::NotFound {
            path: path.clone(),
            hints: self.hints(path),
        })
    }

    fn resolve_exact(
        &self,
        requested: &CommandPath,
        path: &CommandPath,
    ) -> PalResult<Option<ResolvedPrompt>> {
        let mut warnings = Vec::new();

        let (text, source, strategy, schema, description) =
            if let Some(user) = self.load(Tier::User, path, &mut warnings)? {
                match user.merge_strategy() {
                    MergeStrategy::Override => (
                        user.body.clone(),
                        Tier::User,
                        MergeStrategy::Override,
                        user.schema(),
                        user.description().map(str::to_string),
                    ),
                    strategy => {
                        let bundled = self.load(Tier::Bundled, path, &mut warnings)?;
                        let bundled_body = bundled.as_ref().map(|d| d.body.as_str()).unwrap_or("");
                        let schema = user
                            .schema()
                            .or_else(|| bundled.as_ref().and_then(PromptDocument::schema));
                        let description = user
                            .description()
                            .or_else(|| bundled.as_ref().and_then(PromptDocument::description))
                            .map(str::to_string);
                        (
                            strategy.merge(&user.body, bundled_body),
                            Tier::User,
                            strategy,
                            schema,
                            description,
                        )
                    }
                }
            } else if let Some(doc) = self.load(Tier::Bundled, path, &mut warnings)? {
                let description = doc.description().map(str::to_string);
                let schema = doc.schema();
                (doc.body, Tier::Bundled, MergeStrategy::Override, schema, description)
            } else if let Some(doc) = self.load(Tier::Custom, path, &mut warnings)? {
                let description = doc.description().map(str::to_string);
                let schema = doc.schema();
                (doc.body, Tier::Custom, MergeStrategy::Override, schema, description)
            } else {
                return Ok(None);
            };

        let remainder = requested.segments()[path.len()..].to_vec();
        if !remainder.is_empty() {
            tracing::debug!(requested = %requested, matched = %path, "resolved through parent command");
        }

        Ok(Some(ResolvedPrompt {
            requested: requested.clone(),
            matched: path.clone(),
            remainder,
            checksum: calculate_checksum(&text),
            text,
            source,
            strategy,
            schema,
            description,
            warnings,
        }))
    }

    /// Load and parse one document; header problems become warnings
    fn load(
        &self,
        tier: Tier,
        path: &CommandPath,
        warnings: &mut Vec<String>,
    ) -> PalResult<Option<PromptDocument>> {
        let Some(raw) = self.store.get(tier, path)? else {
            return Ok(None);
        };

        let doc = PromptDocument::parse(path.clone(), tier, &raw);
        if let Some(err) = doc.malformed() {
            tracing::warn!("{}", err);
            warnings.push(err.to_string());
        }
        Ok(Some(doc))
    }

    /// Every document path across all tiers, sorted and deduplicated
    pub fn list_paths(&self) -> PalResult<Vec<CommandPath>> {
        let mut paths = BTreeSet::new();
        for tier in Tier::ALL {
            paths.extend(self.store.list(tier)?);
        }
        Ok(paths.into_iter().collect())
    }

    /// Command names (`git commit`) across all tiers
    pub fn list_commands(&self) -> PalResult<Vec<String>> {
        Ok(self
            .list_paths()?
            .iter()
            .map(CommandPath::to_string)
            .collect())
    }

    /// Direct children of `namespace` across all tiers
    pub fn list_subcommands(&self, namespace: &CommandPath) -> PalResult<Vec<String>> {
        let depth = namespace.len();
        let children: BTreeSet<String> = self
            .list_paths()?
            .into_iter()
            .filter(|p| p.len() > depth && p.segments()[..depth] == namespace.segments()[..])
            .map(|p| p.segments()[depth].clone())
            .collect();
        Ok(children.into_iter().collect())
    }

    /// One-line description: the header `description`, else the first line of the body
    pub fn describe(&self, path: &CommandPath) -> PalResult<Option<String>> {
        let resolved = self.resolve(path)?;
        Ok(resolved
            .description
            .clone()
            .or_else(|| extract_description(&resolved.text)))
    }

    /// Top-level commands with descriptions and subcommands, internal documents excluded
    pub fn catalog(&self) -> PalResult<Vec<CatalogEntry>> {
        let namespaces: BTreeSet<String> = self
            .list_paths()?
            .iter()
            .map(|p| p.namespace().to_string())
            .filter(|ns| !bundled::INTERNAL.contains(&ns.as_str()) && ns != "help")
            .collect();

        let mut entries = Vec::with_capacity(namespaces.len());
        for name in namespaces {
            let path = CommandPath::new([name.as_str()])?;
            let subcommands = self.list_subcommands(&path)?;
            // Namespaces without their own document have no description
            let description = match self.resolve_exact(&path, &path)? {
                Some(resolved) => resolved
                    .description
                    .or_else(|| extract_description(&resolved.text)),
                None => None,
            };
            entries.push(CatalogEntry {
                name,
                description,
                subcommands,
            });
        }
        Ok(entries)
    }

    /// Closest known commands to `path`, at most [`MAX_HINTS`]
    pub fn hints(&self, path: &CommandPath) -> Vec<String> {
        let known = match self.list_paths() {
            Ok(known) => known,
            Err(err) => {
                tracing::warn!("failed to list commands for hints: {}", err);
                return Vec::new();
            }
        };

        let wanted = path.to_string();
        let mut scored: Vec<(usize, String)> = known
            .iter()
            .filter(|p| !bundled::INTERNAL.contains(&p.namespace()))
            .filter_map(|p| {
                let name = p.to_string();
                let score = if p.namespace() == path.namespace() {
                    // Same namespace ranks first, closest sibling first
                    edit_distance(&name, &wanted)
                } else {
                    let distance = edit_distance(p.namespace(), path.namespace());
                    if distance > 2 {
                        return None;
                    }
                    100 + distance
                };
                Some((score, name))
            })
            .collect();

        scored.sort();
        scored.into_iter().take(MAX_HINTS).map(|(_, name)| name).collect()
    }
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
