use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::error::{PalError, PalResult};

/// Priority tier a prompt document is loaded from
///
/// Override priority is `User > Bundled > Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    User,
    Bundled,
    Custom,
}

impl Tier {
    /// All tiers in lookup order
    pub const ALL: [Tier; 3] = [Tier::User, Tier::Bundled, Tier::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::User => "user",
            Tier::Bundled => "bundled",
            Tier::Custom => "custom",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive path identifying a command or subcommand (e.g. `git commit`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandPath(Vec<String>);

impl CommandPath {
    /// Build a path from segments, lowercasing each one
    pub fn new<I, S>(segments: I) -> PalResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for segment in segments {
            let segment = segment.as_ref().trim();
            if segment.is_empty() {
                return Err(PalError::InvalidCommandPath(
                    "empty path segment".to_string(),
                ));
            }
            if segment.contains(['/', '\\']) || segment == ".." {
                return Err(PalError::InvalidCommandPath(format!(
                    "segment '{}' contains a path separator",
                    segment
                )));
            }
            normalized.push(segment.to_lowercase());
        }

        if normalized.is_empty() {
            return Err(PalError::InvalidCommandPath("empty command".to_string()));
        }

        Ok(Self(normalized))
    }

    /// Parse user input: segments are separated by whitespace or `.`
    pub fn parse(input: &str) -> PalResult<Self> {
        let input = input.trim().trim_start_matches("$$");
        Self::new(
            input
                .split_whitespace()
                .flat_map(|token| token.split('.'))
                .filter(|s| !s.is_empty()),
        )
    }

    /// Convert a storage key (`git/commit.md`) back into a path
    pub fn from_storage_key(key: &str) -> PalResult<Self> {
        let key = key.strip_suffix(".md").unwrap_or(key);
        Self::new(key.split('/').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment, the command namespace
    pub fn namespace(&self) -> &str {
        &self.0[0]
    }

    /// Path with the last segment removed, `None` for single-segment paths
    pub fn parent(&self) -> Option<CommandPath> {
        if self.0.len() > 1 {
            Some(CommandPath(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// Append a segment, returning a new path
    pub fn child(&self, segment: &str) -> PalResult<CommandPath> {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        CommandPath::new(segments)
    }

    /// Storage key with `/` separators, e.g. `git/commit.md`
    pub fn storage_key(&self) -> String {
        format!("{}.md", self.0.join("/"))
    }

    /// Relative filesystem path for this command under a tier root
    pub fn to_relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.0[..self.0.len() - 1].iter().collect();
        path.push(format!("{}.md", self.0[self.0.len() - 1]));
        path
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
