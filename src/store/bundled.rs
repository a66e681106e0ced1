//! Prompt catalog compiled into the binary

use crate::models::CommandPath;

/// `(storage key, document)` pairs from `prompts/bundled/`
static CATALOG: &[(&str, &str)] = &[
    ("curl.md", include_str!("../../prompts/bundled/curl.md")),
    ("git/commit.md", include_str!("../../prompts/bundled/git/commit.md")),
    ("help.md", include_str!("../../prompts/bundled/help.md")),
    ("notes/add.md", include_str!("../../prompts/bundled/notes/add.md")),
    ("notes/delete.md", include_str!("../../prompts/bundled/notes/delete.md")),
    ("notes/list.md", include_str!("../../prompts/bundled/notes/list.md")),
    ("notes/search.md", include_str!("../../prompts/bundled/notes/search.md")),
    ("notes/tags.md", include_str!("../../prompts/bundled/notes/tags.md")),
    ("notes/view.md", include_str!("../../prompts/bundled/notes/view.md")),
    ("review.md", include_str!("../../prompts/bundled/review.md")),
    ("root.md", include_str!("../../prompts/bundled/root.md")),
];

/// Documents kept out of listings and help output
pub const INTERNAL: &[&str] = &["root", "curl"];

pub fn get(path: &CommandPath) -> Option<&'static str> {
    let key = path.storage_key();
    CATALOG
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, content)| *content)
}

pub fn paths() -> Vec<CommandPath> {
    let mut paths: Vec<CommandPath> = CATALOG
        .iter()
        .filter_map(|(key, _)| CommandPath::from_storage_key(key).ok())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PromptDocument, Tier};

    #[test]
    fn test_catalog_headers_are_valid() {
        for path in paths() {
            let raw = get(&path).unwrap();
            let doc = PromptDocument::parse(path.clone(), Tier::Bundled, raw);
            assert!(
                doc.malformed().is_none(),
                "bundled {} has a malformed header: {:?}",
                path,
                doc.header
            );
            assert!(!doc.body.trim().is_empty(), "bundled {} is empty", path);
        }
    }

    #[test]
    fn test_lookup_nested() {
        let path = CommandPath::parse("git commit").unwrap();
        assert!(get(&path).unwrap().contains("conventional commit"));
        assert!(get(&CommandPath::parse("git push").unwrap()).is_none());
    }
}
