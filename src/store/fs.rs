//! Filesystem-backed store: one directory root per tier
//!
//! Layout: `<root>/git.md` for `git`, `<root>/git/commit.md` for `git commit`.
//! The bundled tier reads the compiled-in catalog unless a directory is set.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{bundled, DocumentStore, PromptWriter};
use crate::config::Settings;
use crate::models::{CommandPath, PalError, PalResult, Tier};

#[derive(Debug, Clone)]
pub struct FsStore {
    user_root: PathBuf,
    custom_root: PathBuf,
    bundled_root: Option<PathBuf>,
}

impl FsStore {
    pub fn new(user_root: impl Into<PathBuf>, custom_root: impl Into<PathBuf>) -> Self {
        Self {
            user_root: user_root.into(),
            custom_root: custom_root.into(),
            bundled_root: None,
        }
    }

    /// Read the bundled tier from a directory instead of the compiled-in catalog
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_root = Some(dir.into());
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let store = Self::new(settings.prompts_path(), settings.custom_prompts_path());
        match settings.bundled_path() {
            Some(dir) => store.with_bundled_dir(dir),
            None => store,
        }
    }

    /// Directory root of a tier, `None` for the compiled-in bundled catalog
    pub fn root(&self, tier: Tier) -> Option<&Path> {
        match tier {
            Tier::User => Some(&self.user_root),
            Tier::Custom => Some(&self.custom_root),
            Tier::Bundled => self.bundled_root.as_deref(),
        }
    }

    /// File a document lives at (whether or not it exists)
    pub fn file_path(&self, tier: Tier, path: &CommandPath) -> Option<PathBuf> {
        self.root(tier).map(|root| root.join(path.to_relative_path()))
    }

    /// Write a document, creating parent directories
    pub fn put(&self, tier: Tier, path: &CommandPath, content: &str) -> PalResult<PathBuf> {
        if tier == Tier::Bundled {
            return Err(PalError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "the bundled tier is read-only",
            )));
        }

        let file = self
            .file_path(tier, path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "tier has no root"))?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, content)?;
        tracing::info!(tier = %tier, path = %path, file = %file.display(), "saved prompt");
        Ok(file)
    }

    fn read(file: &Path) -> PalResult<Option<String>> {
        match fs::read_to_string(file) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if file.is_dir() => {
                tracing::debug!(file = %file.display(), "skipping directory: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find the file for `path` under `root`, matching names case-insensitively
    /// when the lowercase file does not exist
    fn locate(root: &Path, path: &CommandPath) -> PalResult<Option<PathBuf>> {
        let exact = root.join(path.to_relative_path());
        if exact.is_file() {
            return Ok(Some(exact));
        }

        let segments = path.segments();
        let mut dir = root.to_path_buf();
        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            let wanted = if last {
                format!("{}.md", segment)
            } else {
                segment.clone()
            };

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let found = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| if last { p.is_file() } else { p.is_dir() })
                .find(|p| {
                    p.file_name()
                        .is_some_and(|name| name.to_string_lossy().to_lowercase() == wanted)
                });
            match found {
                Some(next) => dir = next,
                None => return Ok(None),
            }
        }
        Ok(Some(dir))
    }

    fn walk(&self, root: &Path, skip: Option<&Path>) -> Vec<CommandPath> {
        let mut paths: Vec<CommandPath> = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let hidden = e.file_name().to_string_lossy().starts_with('.');
                let skipped = skip.is_some_and(|s| e.path() == s);
                !hidden && !skipped
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
            .filter_map(|e| {
                let rel = e.path().strip_prefix(root).ok()?;
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                match CommandPath::from_storage_key(&key) {
                    Ok(path) => Some(path),
                    Err(err) => {
                        tracing::debug!(file = %e.path().display(), "ignoring prompt file: {}", err);
                        None
                    }
                }
            })
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

impl DocumentStore for FsStore {
    fn get(&self, tier: Tier, path: &CommandPath) -> PalResult<Option<String>> {
        let Some(root) = self.root(tier) else {
            return Ok(bundled::get(path).map(str::to_string));
        };
        match Self::locate(root, path)? {
            Some(file) => Self::read(&file),
            None => Ok(None),
        }
    }

    fn list(&self, tier: Tier) -> PalResult<Vec<CommandPath>> {
        let Some(root) = self.root(tier) else {
            return Ok(bundled::paths());
        };
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        // The custom root usually lives inside the user root
        let skip = match tier {
            Tier::User => Some(self.custom_root.as_path()),
            _ => None,
        };
        Ok(self.walk(root, skip))
    }
}

impl PromptWriter for FsStore {
    fn save(&self, tier: Tier, path: &CommandPath, content: &str) -> PalResult<String> {
        let file = self.put(tier, path, content)?;
        Ok(file.display().to_string())
    }

    fn location(&self, tier: Tier, path: &CommandPath) -> String {
        match self.file_path(tier, path) {
            Some(file) => file.display().to_string(),
            None => format!("bundled:{}", path.storage_key()),
        }
    }
}
