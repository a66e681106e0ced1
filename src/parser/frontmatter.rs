//! YAML Frontmatter Parser
//!
//! Splits the optional YAML header from a prompt document with:
//! - BOM (Byte Order Mark) stripping
//! - Line ending normalization (CRLF → LF)
//! - Empty headers (`---\n---`) accepted
//!
//! Parsing is per document: a broken header is reported for that document
//! only and never aborts a batch.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Outcome of splitting a document into header and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    /// No frontmatter block; the whole document is body
    NoHeader(String),
    /// Raw YAML header and the body after the closing delimiter
    Header { yaml: String, body: String },
}

/// Normalize content: strip BOM, normalize line endings
pub fn normalize_content(content: &str) -> String {
    let s = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    s.replace("\r\n", "\n").replace('\r', "\n")
}

fn closing_delimiter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^---[ \t]*$").expect("static frontmatter regex is valid")
    })
}

/// Split frontmatter from body
///
/// Frontmatter must start with `---` on line 1 and end with `---` at the
/// start of a later line (trailing whitespace allowed). A document that opens
/// with `---` but never closes it is treated as plain body.
pub fn split_frontmatter(content: &str) -> Split {
    let Some(after_open) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("--- \n"))
    else {
        return Split::NoHeader(content.to_string());
    };

    match closing_delimiter().find(after_open) {
        Some(m) => {
            let yaml = after_open[..m.start()].trim_end_matches('\n').to_string();
            let body = after_open[m.end()..]
                .strip_prefix('\n')
                .unwrap_or(&after_open[m.end()..])
                .to_string();
            Split::Header { yaml, body }
        }
        None => Split::NoHeader(content.to_string()),
    }
}

/// Deserialize a YAML header; an empty header yields `T::default()`
pub fn parse_header<T: DeserializeOwned + Default>(yaml: &str) -> Result<T> {
    if yaml.trim().is_empty() {
        return Ok(T::default());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).context("Failed to parse YAML frontmatter")?;

    match value {
        serde_yaml::Value::Null => Ok(T::default()),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).context("Invalid frontmatter fields")
        }
        _ => bail!("Frontmatter must be a YAML mapping"),
    }
}

/// Remove leading blank lines from a document body
pub fn trim_leading_blank_lines(body: &str) -> &str {
    let mut rest = body;
    loop {
        let line_end = rest.find('\n');
        let line = match line_end {
            Some(idx) => &rest[..idx],
            None => rest,
        };
        if !line.trim().is_empty() {
            return rest;
        }
        match line_end {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
}

// =============================================================================
// Checksum Functions
// =============================================================================

/// Normalize content for checksum calculation
///
/// Whitespace-only edits (trailing spaces, CRLF, trailing newlines) do not
/// change the checksum.
fn normalize_for_checksum(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// SHA256 checksum of normalized content, formatted `sha256:<hex>`
pub fn calculate_checksum(content: &str) -> String {
    let normalized = normalize_for_checksum(content);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

// =============================================================================
// Tests
// =============================================================================
