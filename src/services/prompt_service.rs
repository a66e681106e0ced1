//! Prompt service - Custom prompt management shared by the dispatcher and CLI

use crate::models::{CommandPath, PalResult, Tier};
use crate::store::{DocumentStore, PromptWriter};

/// Names of all custom prompts, dotted for nested ones (`foo.bar`)
pub fn list_custom_prompts<S: DocumentStore>(store: &S) -> PalResult<Vec<String>> {
    Ok(store
        .list(Tier::Custom)?
        .iter()
        .map(|path| path.segments().join("."))
        .collect())
}

/// Raw text of a custom prompt
pub fn show_custom_prompt<S: DocumentStore>(
    store: &S,
    name: &CommandPath,
) -> PalResult<Option<String>> {
    store.get(Tier::Custom, name)
}

/// Save a custom prompt; a literal `\n` in `content` becomes a newline.
/// Returns where the prompt was written.
pub fn save_custom_prompt<S: PromptWriter>(
    store: &S,
    name: &CommandPath,
    content: &str,
) -> PalResult<String> {
    let content = content.replace("\\n", "\n");
    store.save(Tier::Custom, name, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_save_converts_escaped_newlines() {
        let store = MemoryStore::new();
        let name = CommandPath::parse("tr").unwrap();
        save_custom_prompt(&store, &name, "Translate.\\nKeep tone.").unwrap();
        assert_eq!(
            show_custom_prompt(&store, &name).unwrap().as_deref(),
            Some("Translate.\nKeep tone.")
        );
    }

    #[test]
    fn test_list_uses_dotted_names() {
        let store = MemoryStore::new()
            .with(Tier::Custom, "foo bar baz", "deep")
            .with(Tier::Custom, "tr", "flat")
            .with(Tier::User, "mine", "not custom");
        assert_eq!(list_custom_prompts(&store).unwrap(), vec!["foo.bar.baz", "tr"]);
    }
}
