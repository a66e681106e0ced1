//! Prompt documents and resolution results

use serde::{Deserialize, Deserializer, Serialize};

use super::command::{CommandPath, Tier};
use super::error::PalError;
use super::schema::{ArgumentSchema, FlagSpec, RestSpec};
use crate::parser::frontmatter::{self, Split};

/// How a user-tier document combines with its bundled counterpart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// User document replaces the bundled one
    #[default]
    Override,
    /// Bundled text first, then the user text
    Append,
    /// User text first, then the bundled text
    Prepend,
}

impl MergeStrategy {
    /// Unknown values fall back to `Override`
    pub fn from_str_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "append" => MergeStrategy::Append,
            "prepend" => MergeStrategy::Prepend,
            _ => MergeStrategy::Override,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Override => "override",
            MergeStrategy::Append => "append",
            MergeStrategy::Prepend => "prepend",
        }
    }

    /// Combine a user body with a bundled body
    ///
    /// Non-empty parts are joined by one blank line. Trailing newlines of the
    /// first part are dropped before joining, and an empty part contributes
    /// nothing (no separator), so the result is not always
    /// `first + "\n\n" + second`.
    pub fn merge(&self, user: &str, bundled: &str) -> String {
        let (first, second) = match self {
            MergeStrategy::Override => return user.to_string(),
            MergeStrategy::Append => (bundled, user),
            MergeStrategy::Prepend => (user, bundled),
        };

        match (first.is_empty(), second.is_empty()) {
            (true, _) => second.to_string(),
            (_, true) => first.to_string(),
            _ => format!("{}\n\n{}", first.trim_end_matches('\n'), second),
        }
    }
}

fn lenient_strategy<'de, D>(deserializer: D) -> Result<MergeStrategy, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .as_deref()
        .map(MergeStrategy::from_str_lenient)
        .unwrap_or_default())
}

/// Structured header of a prompt document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PromptHeader {
    #[serde(default, deserialize_with = "lenient_strategy")]
    pub merge_strategy: MergeStrategy,

    /// One-line description shown in listings
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub arguments: Vec<FlagSpec>,

    #[serde(default)]
    pub rest: Option<RestSpec>,
}

impl PromptHeader {
    /// Declared argument schema, `None` when the header declares none
    pub fn schema(&self) -> Option<ArgumentSchema> {
        if self.arguments.is_empty() && self.rest.is_none() {
            None
        } else {
            Some(ArgumentSchema::new(self.arguments.clone(), self.rest.clone()))
        }
    }
}

/// A single instruction document loaded from one tier
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDocument {
    pub path: CommandPath,
    pub tier: Tier,
    /// Text after the header, leading blank lines removed; the raw
    /// document when there is no header or it is malformed
    pub body: String,
    /// `Ok(None)` without header, `Err(message)` for a malformed header
    pub header: Result<Option<PromptHeader>, String>,
}

impl PromptDocument {
    /// Parse raw document text; never fails, header errors are kept per document
    pub fn parse(path: CommandPath, tier: Tier, raw: &str) -> Self {
        let normalized = frontmatter::normalize_content(raw);

        match frontmatter::split_frontmatter(&normalized) {
            // Documents without a header are returned byte for byte
            Split::NoHeader(_) => Self {
                path,
                tier,
                body: raw.to_string(),
                header: Ok(None),
            },
            Split::Header { yaml, body } => {
                let header = frontmatter::parse_header::<PromptHeader>(&yaml)
                    .map_err(|e| format!("{:#}", e))
                    .and_then(|header| match header.schema() {
                        Some(schema) => schema.check().map(|_| Some(header)),
                        None => Ok(Some(header)),
                    });
                // A malformed header leaves the document untouched
                let body = match header {
                    Ok(_) => frontmatter::trim_leading_blank_lines(&body).to_string(),
                    Err(_) => raw.to_string(),
                };
                Self {
                    path,
                    tier,
                    body,
                    header,
                }
            }
        }
    }

    /// Parsed header, `None` when absent or malformed
    pub fn header(&self) -> Option<&PromptHeader> {
        self.header.as_ref().ok().and_then(Option::as_ref)
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        self.header().map(|h| h.merge_strategy).unwrap_or_default()
    }

    pub fn schema(&self) -> Option<ArgumentSchema> {
        self.header().and_then(PromptHeader::schema)
    }

    pub fn description(&self) -> Option<&str> {
        self.header().and_then(|h| h.description.as_deref())
    }

    /// The header error as a typed error, if the header was malformed
    pub fn malformed(&self) -> Option<PalError> {
        self.header
            .as_ref()
            .err()
            .map(|message| PalError::MalformedFrontmatter {
                path: format!("{}:{}", self.tier, self.path.storage_key()),
                message: message.clone(),
            })
    }
}

/// Final instruction text for a command path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPrompt {
    /// Path as requested
    pub requested: CommandPath,
    /// Path of the document that answered
    pub matched: CommandPath,
    /// Requested segments not covered by `matched` (parent fallback)
    pub remainder: Vec<String>,
    pub text: String,
    /// Tier that supplied the primary document
    pub source: Tier,
    pub strategy: MergeStrategy,
    pub schema: Option<ArgumentSchema>,
    /// Header description of the primary document
    pub description: Option<String>,
    pub checksum: String,
    /// Recovered problems, e.g. malformed headers
    pub warnings: Vec<String>,
}

impl ResolvedPrompt {
    pub fn is_fallback(&self) -> bool {
        !self.remainder.is_empty()
    }
}
