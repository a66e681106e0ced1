//! Integration tests for command-line dispatch over the bundled catalog

use pal::services::StageStatus;
use pal::{DispatchContext, Dispatcher, FsStore};
use tempfile::TempDir;

fn setup() -> (TempDir, Dispatcher<FsStore>) {
    let temp_dir = TempDir::new().unwrap();
    let user = temp_dir.path().join("prompts");
    let dispatcher = Dispatcher::new(FsStore::new(&user, user.join("custom")));
    (temp_dir, dispatcher)
}

#[test]
fn test_notes_add_parses_tags_and_content() {
    let (_temp_dir, dispatcher) = setup();
    let output = dispatcher
        .run(
            "$$notes add -t work,meeting Today's standup notes",
            &DispatchContext::new(),
        )
        .unwrap();

    assert!(output.success());
    let text = output.text();
    assert!(text.starts_with("## $$notes add -t work,meeting Today's standup notes\n\nAdd a new note"));
    assert!(text.contains("  - tags: work,meeting\n  - rest: Today's standup notes"));
}

#[test]
fn test_notes_add_requires_content() {
    let (_temp_dir, dispatcher) = setup();
    let output = dispatcher
        .run("notes add -t work", &DispatchContext::new())
        .unwrap();
    assert_eq!(output.stages[0].status, StageStatus::Failed);
    assert!(output.text().contains("Invalid argument 'rest'"));
}

#[test]
fn test_integer_flag_is_coerced() {
    let (_temp_dir, dispatcher) = setup();
    let ok = dispatcher
        .run("notes list -n 5", &DispatchContext::new())
        .unwrap();
    assert!(ok.text().contains("  - limit: 5"));

    let bad = dispatcher
        .run("notes list -n many", &DispatchContext::new())
        .unwrap();
    assert_eq!(bad.stages[0].status, StageStatus::Failed);
    assert!(bad.text().contains("Invalid argument 'limit'"));
}

#[test]
fn test_commit_then_review_pipeline() {
    let (_temp_dir, dispatcher) = setup();
    let output = dispatcher
        .run("git commit | review", &DispatchContext::new())
        .unwrap();

    assert_eq!(output.stages.len(), 2);
    let text = output.text();
    let parts: Vec<&str> = text.split("\n\n---\n\n").collect();
    assert!(parts[0].starts_with("## $$git commit\n\nCreate a git commit"));
    assert!(parts.last().unwrap().contains("use the result of `$$git commit`"));
}

#[test]
fn test_saved_prompt_runs_with_input() {
    let (temp_dir, dispatcher) = setup();
    let ctx = DispatchContext::new().with_reply("Hola mundo");

    let saved = dispatcher
        .run("$$prompt tr Translate to English.\\nKeep the tone.", &ctx)
        .unwrap();
    assert!(saved.success());
    assert!(temp_dir.path().join("prompts/custom/tr.md").is_file());

    let text = dispatcher.run("$$tr $REPLY", &ctx).unwrap().text();
    assert!(text.starts_with("**EXECUTE THE FOLLOWING INSTRUCTION:**\n\nTranslate to English.\nKeep the tone."));
    assert!(text.contains("**INPUT:**\n\nHola mundo"));
}

#[test]
fn test_namespace_help_lists_bundled_subcommands() {
    let (_temp_dir, dispatcher) = setup();
    let text = dispatcher
        .run("notes --help", &DispatchContext::new())
        .unwrap()
        .text();
    assert!(text.starts_with("## $$notes --help\n\nAvailable commands:\n\n  - notes add"));
}
