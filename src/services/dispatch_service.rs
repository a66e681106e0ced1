//! Dispatch service - Runs a `$$` command line through the handler chain
//!
//! Each stage is handled by the first matching handler: `echo`, `prompt`,
//! help requests, then resolved prompt documents. The rendered text of every
//! stage is handed back to the host, which executes the instructions itself.

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use super::prompt_service;
use crate::models::{ArgumentSchema, CommandPath, PalError, ParsedArguments, Tier};
use crate::parser::{self, Operator, PipelineStage};
use crate::resolver::Resolver;
use crate::store::{DocumentStore, PromptWriter};
use crate::Result;

/// Separator between stage outputs
pub const STAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Commands answered by hardcoded handlers
pub const BUILTIN_COMMANDS: &[&str] = &["echo", "help", "prompt"];

fn variable_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Z][A-Z0-9_]*)").unwrap())
}

/// Caller-supplied session context
///
/// Variables are substituted into stage arguments as `$NAME`. Names are
/// case-insensitive and stored uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchContext {
    variables: BTreeMap<String, String>,
}

impl DispatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$MSG`: the current user message
    pub fn with_msg(self, msg: impl Into<String>) -> Self {
        self.with_var("MSG", msg)
    }

    /// `$REPLY`: the previous assistant reply
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.with_var("REPLY", reply)
    }

    /// `$SESSION`: the host session id
    pub fn with_session(self, session: impl Into<String>) -> Self {
        self.with_var("SESSION", session)
    }

    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.variables.insert(name.to_ascii_uppercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Replace known `$NAME` references; unknown ones stay literal
    pub fn substitute(&self, text: &str) -> String {
        if self.variables.is_empty() || !text.contains('$') {
            return text.to_string();
        }
        variable_regex()
            .replace_all(text, |caps: &Captures| match self.variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Ok,
    Failed,
    /// Not run: joined by `&&` to a failed stage
    Skipped,
}

/// Outcome of one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    /// Command path as typed, e.g. `git commit`
    pub command: String,
    pub operator: Option<Operator>,
    pub status: StageStatus,
    pub output: String,
}

/// Result of dispatching a whole command line
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchOutput {
    pub stages: Vec<StageReport>,
}

impl DispatchOutput {
    /// Text handed to the host: stage outputs joined by [`STAGE_SEPARATOR`]
    pub fn text(&self) -> String {
        self.stages
            .iter()
            .map(|s| s.output.as_str())
            .collect::<Vec<_>>()
            .join(STAGE_SEPARATOR)
    }

    /// True when no stage failed or was skipped
    pub fn success(&self) -> bool {
        self.stages.iter().all(|s| s.status == StageStatus::Ok)
    }
}

pub struct Dispatcher<S> {
    resolver: Resolver<S>,
}

impl<S: DocumentStore + PromptWriter> Dispatcher<S> {
    pub fn new(store: S) -> Self {
        Self {
            resolver: Resolver::new(store),
        }
    }

    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    /// Parse and run a command line
    pub fn run(&self, command_line: &str, ctx: &DispatchContext) -> Result<DispatchOutput> {
        let pipeline = parser::parse(command_line)?;
        if pipeline.is_empty() {
            anyhow::bail!("No command provided");
        }

        let mut output = DispatchOutput::default();
        let mut previous_ok = true;
        let mut previous: Option<&PipelineStage> = None;

        for stage in &pipeline.stages {
            if stage.operator == Some(Operator::And) && !previous_ok {
                tracing::debug!(command = %stage.command, "skipping stage after failure");
                output.stages.push(StageReport {
                    command: stage.command.to_string(),
                    operator: stage.operator,
                    status: StageStatus::Skipped,
                    output: format!("Skipped `$${}`: previous command failed.", stage.command),
                });
                continue;
            }

            let piped_from = match stage.operator {
                Some(Operator::Pipe) => previous,
                _ => None,
            };
            let (status, text) = match self.run_stage(stage, piped_from, ctx) {
                Ok(text) => (StageStatus::Ok, text),
                Err(text) => {
                    tracing::warn!(command = %stage.command, "stage failed");
                    (StageStatus::Failed, text)
                }
            };

            previous_ok = status == StageStatus::Ok;
            previous = Some(stage);
            output.stages.push(StageReport {
                command: stage.command.to_string(),
                operator: stage.operator,
                status,
                output: text,
            });
        }

        Ok(output)
    }

    /// Built-ins plus every document path, sorted
    pub fn list_commands(&self) -> Result<Vec<String>> {
        let mut commands: BTreeSet<String> = self.resolver.list_commands()?.into_iter().collect();
        commands.extend(BUILTIN_COMMANDS.iter().map(|c| c.to_string()));
        Ok(commands.into_iter().collect())
    }

    /// Run one stage. `Err` carries the rendered failure text.
    fn run_stage(
        &self,
        stage: &PipelineStage,
        piped_from: Option<&PipelineStage>,
        ctx: &DispatchContext,
    ) -> std::result::Result<String, String> {
        let command = &stage.command;

        match command.namespace() {
            "echo" => return Ok(ctx.substitute(&stage.args_after(1))),
            "prompt" => return self.handle_prompt(&stage.args_after(1)),
            _ => {}
        }

        if let Some(namespace) = help_target(stage) {
            return self.handle_help(namespace);
        }

        self.handle_resolved(stage, piped_from, ctx)
    }

    fn handle_prompt(&self, input: &str) -> std::result::Result<String, String> {
        let store = self.resolver.store();
        let input = input.trim();
        if input.is_empty() {
            let prompts = prompt_service::list_custom_prompts(store).map_err(render_error)?;
            let content = if prompts.is_empty() {
                "No custom prompts defined yet.".to_string()
            } else {
                format!("Custom prompts:\n\n{}", bullet_list(&prompts))
            };
            return Ok(format!("## $$prompt\n\n{}", content));
        }

        let (name, content) = match input.split_once(char::is_whitespace) {
            Some((name, content)) => (name, content.trim_start()),
            None => (input, ""),
        };
        let path = CommandPath::parse(name).map_err(render_error)?;
        let header = format!("## $$prompt {}", name);

        if !content.is_empty() {
            prompt_service::save_custom_prompt(store, &path, content).map_err(render_error)?;
            return Ok(format!(
                "{}\n\nPrompt '{}' saved. Use it with: $${} <input>",
                header, name, name
            ));
        }

        let location = store.location(Tier::Custom, &path);
        match prompt_service::show_custom_prompt(store, &path).map_err(render_error)? {
            Some(existing) => Ok(format!(
                "{}\n\nFile: `{}`\n\nCurrent definition:\n\n```\n{}\n```\n\n\
                 IMPORTANT: Display the FULL content above to the user, do not summarize.",
                header, location, existing
            )),
            None => Err(format!(
                "{}\n\nError: Prompt not found.\n\nTo create it:\n\
                 $$prompt {} Your instruction here\n\nOr create file: `{}`",
                header, name, location
            )),
        }
    }

    fn handle_help(&self, namespace: Option<CommandPath>) -> std::result::Result<String, String> {
        let Some(namespace) = namespace else {
            return self.handle_general_help();
        };

        let subcommands = self
            .resolver
            .list_subcommands(&namespace)
            .map_err(render_error)?;
        let content = if subcommands.is_empty() {
            format!("No subcommands available for '{}'.", namespace)
        } else {
            let entries: Vec<String> = subcommands
                .iter()
                .map(|sub| format!("{} {}", namespace, sub))
                .collect();
            format!("Available commands:\n\n{}", bullet_list(&entries))
        };
        Ok(format!("## $${} --help\n\n{}", namespace, content))
    }

    /// Bare `help`: the help document followed by the command catalog
    fn handle_general_help(&self) -> std::result::Result<String, String> {
        let mut output = String::from("## $$help");

        match self.resolver.resolve(&CommandPath::new(["help"]).map_err(render_error)?) {
            Ok(resolved) => {
                output.push_str("\n\n");
                output.push_str(resolved.text.trim_end());
            }
            Err(PalError::NotFound { .. }) => {}
            Err(err) => return Err(render_error(err)),
        }

        let catalog = self.resolver.catalog().map_err(render_error)?;
        let mut lines: Vec<String> = BUILTIN_COMMANDS
            .iter()
            .filter(|name| **name != "help")
            .map(|name| format!("$${}", name))
            .collect();
        for entry in catalog {
            let mut line = format!("$${}", entry.name);
            if let Some(description) = entry.description {
                line.push_str(&format!(": {}", description));
            }
            if !entry.subcommands.is_empty() {
                line.push_str(&format!(" ({})", entry.subcommands.join(", ")));
            }
            lines.push(line);
        }
        output.push_str(&format!("\n\nAvailable commands:\n\n{}", bullet_list(&lines)));
        Ok(output)
    }

    fn handle_resolved(
        &self,
        stage: &PipelineStage,
        piped_from: Option<&PipelineStage>,
        ctx: &DispatchContext,
    ) -> std::result::Result<String, String> {
        let resolved = match self.resolver.resolve(&stage.command) {
            Ok(resolved) => resolved,
            Err(PalError::NotFound { path, hints }) => return Err(render_not_found(&path, &hints)),
            Err(err) => return Err(render_error(err)),
        };

        let args = ctx.substitute(&stage.args_after(resolved.matched.len()));
        let parsed = match &resolved.schema {
            Some(schema) => match schema.validate(&args) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    return Err(render_invalid(&resolved.matched, &args, schema, &err));
                }
            },
            None => None,
        };

        let mut output = if resolved.source == Tier::Custom {
            wrap_custom(&resolved.text, &args)
        } else {
            let mut header = format!("## $${}", resolved.matched);
            if !args.is_empty() {
                header.push(' ');
                header.push_str(&args);
            }
            format!("{}\n\n{}", header, resolved.text)
        };

        if let Some(parsed) = parsed.filter(|p| !p.is_empty()) {
            output.push_str("\n\n");
            output.push_str(&render_parsed(&parsed));
        }
        if let Some(previous) = piped_from {
            output.push_str(&format!(
                "\n\nInput: use the result of `$${}` as the input of this command.",
                previous.command
            ));
        }

        Ok(output)
    }
}

/// Namespace of a help request: `Some(None)` for bare `help`
fn help_target(stage: &PipelineStage) -> Option<Option<CommandPath>> {
    let segments = stage.command.segments();

    if stage.args.trim_start().starts_with("--help") {
        return Some(Some(stage.command.clone()));
    }
    match segments {
        [only] if only == "help" && stage.args.trim().is_empty() => Some(None),
        [.., last] if last == "help" => {
            let namespace = CommandPath::new(&segments[..segments.len() - 1]).ok()?;
            Some(Some(namespace))
        }
        _ => None,
    }
}

fn wrap_custom(instruction: &str, input: &str) -> String {
    let mut content = format!(
        "**EXECUTE THE FOLLOWING INSTRUCTION:**\n\n{}\n\n",
        instruction.trim_end()
    );
    if !input.is_empty() {
        content.push_str(&format!(
            "---\n\n**INPUT:**\n\n{}\n\n---\n\n\
             **ACTION REQUIRED:** Process the input according to the instruction above \
             and output the result.",
            input
        ));
    }
    content.trim_end().to_string()
}

fn render_parsed(parsed: &ParsedArguments) -> String {
    let mut lines: Vec<String> = parsed
        .values
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();
    if let Some(rest) = &parsed.rest {
        lines.push(format!("rest: {}", rest));
    }
    format!("Parsed arguments:\n\n{}", bullet_list(&lines))
}

fn render_not_found(path: &CommandPath, hints: &[String]) -> String {
    let mut output = format!("## $${}\n\nUnknown command: {}", path, path);
    if !hints.is_empty() {
        let hints: Vec<String> = hints.iter().map(|h| format!("$${}", h)).collect();
        output.push_str(&format!("\n\nDid you mean:\n\n{}", bullet_list(&hints)));
    }
    output
}

fn render_invalid(
    path: &CommandPath,
    args: &str,
    schema: &ArgumentSchema,
    err: &PalError,
) -> String {
    let mut header = format!("## $${}", path);
    if !args.is_empty() {
        header.push(' ');
        header.push_str(args);
    }
    let mut output = format!("{}\n\nError: {}", header, err);
    let usage = schema.usage_lines();
    if !usage.is_empty() {
        output.push_str(&format!("\n\nUsage:\n\n{}", bullet_list(&usage)));
    }
    output
}

fn render_error(err: PalError) -> String {
    format!("Error: {}", err)
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
