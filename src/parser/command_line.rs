//! `$$command [subcommand] [args]` line parser
//!
//! A line is a sequence of stages joined by `|`, `&&` or `;`, evaluated
//! strictly left to right. Operators inside quotes are literal.

use serde::Serialize;
use std::fmt;

use super::tokens::tokenize;
use crate::models::{CommandPath, PalResult};

/// Operator joining a stage to the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `|`: previous output is this stage's input
    Pipe,
    /// `&&`: run only if the previous stage succeeded
    And,
    /// `;`: run regardless of the previous outcome
    Seq,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Pipe => "|",
            Operator::And => "&&",
            Operator::Seq => ";",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One command invocation within a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub command: CommandPath,
    /// Raw argument text after the command path
    pub args: String,
    /// `None` for the first stage
    pub operator: Option<Operator>,
    /// Stage text with the `$$` prefix removed
    #[serde(skip)]
    raw: String,
    /// Original-case text of each command segment
    #[serde(skip)]
    raw_segments: Vec<String>,
    /// Segments contributed by the first token (`notes.add` gives 2)
    #[serde(skip)]
    first_segments: usize,
    /// Byte offset in `raw` where the first token ends
    #[serde(skip)]
    first_end: usize,
}

impl PipelineStage {
    /// Argument text when only the first `matched` segments named a document.
    /// The unmatched part of the line is handed back verbatim.
    pub fn args_after(&self, matched: usize) -> String {
        if matched >= self.raw_segments.len() {
            return self.args.clone();
        }

        let tail = self.raw[self.first_end..].trim();
        if matched >= self.first_segments {
            return tail.to_string();
        }

        let head = self.raw_segments[matched..self.first_segments].join(".");
        if tail.is_empty() {
            head
        } else {
            format!("{} {}", head, tail)
        }
    }
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    pub stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

/// Parse a raw command line into pipeline stages
pub fn parse(input: &str) -> PalResult<Pipeline> {
    let mut stages = Vec::new();
    let mut operator = None;

    for (op, segment) in split_operators(input) {
        if op.is_some() {
            operator = op;
        }
        if let Some(stage) = parse_stage(segment, operator)? {
            stages.push(stage);
        }
    }

    // The first stage never carries an operator
    if let Some(first) = stages.first_mut() {
        first.operator = None;
    }

    Ok(Pipeline { stages })
}

/// Split on top-level operators; each segment carries the operator before it
fn split_operators(input: &str) -> Vec<(Option<Operator>, &str)> {
    let mut segments = Vec::new();
    let mut chars = input.char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut seg_start = 0;
    let mut pending: Option<Operator> = None;

    while let Some((idx, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' && q == '"' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            prev = Some(c);
            continue;
        }

        let op = match c {
            '"' | '\'' if prev.map_or(true, char::is_whitespace) => {
                quote = Some(c);
                None
            }
            '|' => Some((Operator::Pipe, 1)),
            ';' => Some((Operator::Seq, 1)),
            '&' if matches!(chars.peek(), Some((_, '&'))) => {
                chars.next();
                Some((Operator::And, 2))
            }
            _ => None,
        };

        match op {
            Some((op, width)) => {
                segments.push((pending, &input[seg_start..idx]));
                pending = Some(op);
                seg_start = idx + width;
                prev = None;
            }
            None => prev = Some(c),
        }
    }

    segments.push((pending, &input[seg_start..]));
    segments
}

fn is_bare_word(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_stage(segment: &str, operator: Option<Operator>) -> PalResult<Option<PipelineStage>> {
    let segment = segment.trim();
    let segment = segment.strip_prefix("$$").unwrap_or(segment).trim_start();
    if segment.is_empty() {
        return Ok(None);
    }

    let tokens = tokenize(segment);
    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    let mut raw_segments: Vec<String> = first
        .text
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let first_segments = raw_segments.len();
    let mut args_start = first.end;

    if let Some(second) = tokens.get(1) {
        if !second.quoted && is_bare_word(&second.text) {
            raw_segments.push(second.text.clone());
            args_start = second.end;
        }
    }

    let command = CommandPath::new(&raw_segments)?;

    Ok(Some(PipelineStage {
        command,
        args: segment[args_start..].trim().to_string(),
        operator,
        raw: segment.to_string(),
        raw_segments,
        first_segments,
        first_end: first.end,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(stage: &PipelineStage) -> Vec<&str> {
        stage.command.segments().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_pipe_between_commands() {
        let pipeline = parse("git commit | review").unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(segs(&pipeline.stages[0]), vec!["git", "commit"]);
        assert_eq!(pipeline.stages[0].args, "");
        assert_eq!(pipeline.stages[0].operator, None);
        assert_eq!(segs(&pipeline.stages[1]), vec!["review"]);
        assert_eq!(pipeline.stages[1].args, "");
        assert_eq!(pipeline.stages[1].operator, Some(Operator::Pipe));
    }

    #[test]
    fn test_notes_add_with_flags() {
        let pipeline = parse("notes add -t work,meeting Today's standup notes").unwrap();
        assert_eq!(pipeline.len(), 1);
        let stage = &pipeline.stages[0];
        assert_eq!(segs(stage), vec!["notes", "add"]);
        assert_eq!(stage.args, "-t work,meeting Today's standup notes");
    }

    #[test]
    fn test_all_operators_left_to_right() {
        let pipeline = parse("a && b ; c | d").unwrap();
        let ops: Vec<_> = pipeline.stages.iter().map(|s| s.operator).collect();
        assert_eq!(
            ops,
            vec![None, Some(Operator::And), Some(Operator::Seq), Some(Operator::Pipe)]
        );
    }

    #[test]
    fn test_operators_inside_quotes_are_literal() {
        let pipeline = parse(r#"echo "a | b && c ; d" | review"#).unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.stages[0].args, r#""a | b && c ; d""#);
    }

    #[test]
    fn test_apostrophe_does_not_open_quote() {
        let pipeline = parse("tr it's fine | review").unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.stages[0].command.segments(), &["tr"]);
        assert_eq!(pipeline.stages[0].args, "it's fine");
        assert_eq!(pipeline.stages[0].args_after(1), "it's fine");
    }

    #[test]
    fn test_single_ampersand_is_text() {
        let pipeline = parse("echo salt & pepper").unwrap();
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.stages[0].args, "& pepper");
    }

    #[test]
    fn test_flag_is_not_subcommand() {
        let pipeline = parse("git --help").unwrap();
        assert_eq!(segs(&pipeline.stages[0]), vec!["git"]);
        assert_eq!(pipeline.stages[0].args, "--help");
    }

    #[test]
    fn test_dotted_command_and_prefix() {
        let pipeline = parse("$$notes.add hello").unwrap();
        assert_eq!(segs(&pipeline.stages[0]), vec!["notes", "add"]);
        assert_eq!(pipeline.stages[0].args, "hello");
    }

    #[test]
    fn test_args_after_restores_original_case() {
        let pipeline = parse("TR Hello World").unwrap();
        let stage = &pipeline.stages[0];
        assert_eq!(segs(stage), vec!["tr", "hello"]);
        assert_eq!(stage.args_after(1), "Hello World");
        assert_eq!(stage.args_after(2), "World");
    }

    #[test]
    fn test_args_after_keeps_spacing_and_dots() {
        let pipeline = parse("echo hello   world").unwrap();
        assert_eq!(pipeline.stages[0].args_after(1), "hello   world");

        let pipeline = parse("foo.bar.baz qux").unwrap();
        let stage = &pipeline.stages[0];
        assert_eq!(segs(stage), vec!["foo", "bar", "baz", "qux"]);
        assert_eq!(stage.args_after(1), "bar.baz qux");
        assert_eq!(stage.args_after(3), "qux");
        assert_eq!(stage.args_after(4), "");
    }

    #[test]
    fn test_empty_stages_dropped() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  ;  | ").unwrap().is_empty());
        let pipeline = parse("a | | b ;").unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.stages[1].operator, Some(Operator::Pipe));
    }
}
