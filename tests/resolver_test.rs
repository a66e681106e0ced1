//! Integration tests for three-tier resolution over the filesystem store

use pal::models::{MergeStrategy, PalError, Tier};
use pal::{CommandPath, FsStore, Resolver};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn path(s: &str) -> CommandPath {
    CommandPath::parse(s).unwrap()
}

fn write(root: &Path, key: &str, content: &str) {
    let file = root.join(key);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

/// User root `prompts/`, custom root `prompts/custom/`, compiled-in bundled catalog
fn setup() -> (TempDir, Resolver<FsStore>) {
    let temp_dir = TempDir::new().unwrap();
    let user = temp_dir.path().join("prompts");
    let store = FsStore::new(&user, user.join("custom"));
    (temp_dir, Resolver::new(store))
}

#[test]
fn test_bundled_catalog_without_user_files() {
    let (_temp_dir, resolver) = setup();
    let resolved = resolver.resolve(&path("git commit")).unwrap();
    assert_eq!(resolved.source, Tier::Bundled);
    assert!(resolved.text.starts_with("Create a git commit"));
    assert!(resolved.schema.is_some());
    assert_eq!(
        resolved.description.as_deref(),
        Some("Create a conventional git commit")
    );
}

#[test]
fn test_user_file_overrides_bundled() {
    let (temp_dir, resolver) = setup();
    write(
        &temp_dir.path().join("prompts"),
        "git/commit.md",
        "Commit with gitmoji.",
    );

    let resolved = resolver.resolve(&path("GIT COMMIT")).unwrap();
    assert_eq!(resolved.text, "Commit with gitmoji.");
    assert_eq!(resolved.source, Tier::User);
    assert_eq!(resolved.strategy, MergeStrategy::Override);
    assert!(resolved.schema.is_none());
}

#[test]
fn test_user_file_appends_to_bundled() {
    let (temp_dir, resolver) = setup();
    write(
        &temp_dir.path().join("prompts"),
        "review.md",
        "---\nmerge_strategy: append\n---\n\nAlso check naming.\n",
    );

    let resolved = resolver.resolve(&path("review")).unwrap();
    assert!(resolved.text.starts_with("Review the input critically."));
    assert!(resolved.text.ends_with("review that output.\n\nAlso check naming.\n"));
    // The bundled schema still applies
    assert!(resolved.schema.unwrap().rest.is_some());
}

#[test]
fn test_custom_prompt_is_lowest_priority() {
    let (temp_dir, resolver) = setup();
    let custom = temp_dir.path().join("prompts/custom");
    write(&custom, "tr.md", "Translate to English.");
    write(&custom, "review.md", "Custom review");

    assert_eq!(resolver.resolve(&path("tr")).unwrap().source, Tier::Custom);
    assert_eq!(
        resolver.resolve(&path("review")).unwrap().source,
        Tier::Bundled
    );
}

#[test]
fn test_bundled_directory_replaces_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let bundled = temp_dir.path().join("bundled");
    write(&bundled, "ops/deploy.md", "Deploy the service.");
    let user = temp_dir.path().join("prompts");
    let resolver = Resolver::new(FsStore::new(&user, user.join("custom")).with_bundled_dir(&bundled));

    assert_eq!(
        resolver.resolve(&path("ops deploy")).unwrap().text,
        "Deploy the service."
    );
    assert!(resolver.resolve(&path("git commit")).is_err());
}

#[test]
fn test_malformed_user_file_does_not_break_siblings() {
    let (temp_dir, resolver) = setup();
    let user = temp_dir.path().join("prompts");
    write(&user, "notes/add.md", "---\narguments: [unclosed\n---\nBroken note add");
    write(&user, "notes/list.md", "My list");

    let resolved = resolver.resolve(&path("notes add")).unwrap();
    assert_eq!(
        resolved.text,
        "---\narguments: [unclosed\n---\nBroken note add"
    );
    assert_eq!(resolved.warnings.len(), 1);
    assert_eq!(resolver.resolve(&path("notes list")).unwrap().text, "My list");
}

#[test]
fn test_parent_fallback_and_not_found() {
    let (_temp_dir, resolver) = setup();

    let resolved = resolver.resolve(&path("review security")).unwrap();
    assert_eq!(resolved.matched, path("review"));
    assert_eq!(resolved.remainder, vec!["security"]);

    match resolver.resolve(&path("deploy")) {
        Err(PalError::NotFound { path: p, .. }) => assert_eq!(p, path("deploy")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_listing_merges_tiers() {
    let (temp_dir, resolver) = setup();
    let user = temp_dir.path().join("prompts");
    write(&user, "git/push.md", "Push");
    write(&user.join("custom"), "tr.md", "Translate");

    let commands = resolver.list_commands().unwrap();
    for expected in ["git commit", "git push", "notes add", "review", "tr"] {
        assert!(commands.contains(&expected.to_string()), "missing {}", expected);
    }
    assert_eq!(
        resolver.list_subcommands(&path("git")).unwrap(),
        vec!["commit", "push"]
    );
    assert_eq!(
        resolver.list_subcommands(&path("notes")).unwrap(),
        vec!["add", "delete", "list", "search", "tags", "view"]
    );
}

#[test]
fn test_listed_mixed_case_file_resolves() {
    let (temp_dir, resolver) = setup();
    let user = temp_dir.path().join("prompts");
    write(&user, "Standup.md", "Run the daily standup.");

    assert!(resolver
        .list_commands()
        .unwrap()
        .contains(&"standup".to_string()));
    let resolved = resolver.resolve(&path("Standup")).unwrap();
    assert_eq!(resolved.source, Tier::User);
    assert_eq!(resolved.text, "Run the daily standup.");
}
