//! Settings for prompt roots, logging and the curl tool
//!
//! Loaded from `~/.pal/config.toml` when present, then overridden by `PAL_*`
//! environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PAL_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// User tier root
    pub prompts_dir: PathBuf,

    /// Custom tier root (defaults to `<prompts_dir>/custom`)
    pub custom_prompts_dir: Option<PathBuf>,

    /// Directory replacing the compiled-in bundled catalog
    pub bundled_dir: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Default timeout for the curl tool, in seconds
    pub curl_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("~/.pal/prompts"),
            custom_prompts_dir: None,
            bundled_dir: None,
            log_level: "info".to_string(),
            curl_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Configuration directory (`~/.pal`)
    pub fn config_dir() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".pal"))
    }

    /// Default config file path (`~/.pal/config.toml`)
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from `path` (or the default config file), then apply the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load_from(&Self::config_path()?)?,
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Save as TOML, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `PAL_*` overrides using the given variable lookup
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            var(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.trim().is_empty())
        };

        if let Some(dir) = get("PROMPTS_DIR") {
            self.prompts_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("CUSTOM_PROMPTS_DIR") {
            self.custom_prompts_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = get("BUNDLED_DIR") {
            self.bundled_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level.to_lowercase();
        }
        if let Some(timeout) = get("CURL_TIMEOUT") {
            self.curl_timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{}CURL_TIMEOUT must be seconds, got '{}'", ENV_PREFIX, timeout))?;
        }

        Ok(())
    }

    /// Expanded user tier root
    pub fn prompts_path(&self) -> PathBuf {
        expand_home(&self.prompts_dir)
    }

    /// Expanded custom tier root
    pub fn custom_prompts_path(&self) -> PathBuf {
        match &self.custom_prompts_dir {
            Some(dir) => expand_home(dir),
            None => self.prompts_path().join("custom"),
        }
    }

    /// Expanded bundled directory, if one replaces the compiled-in catalog
    pub fn bundled_path(&self) -> Option<PathBuf> {
        self.bundled_dir.as_deref().map(expand_home)
    }

    /// Create the user and custom roots
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.prompts_path(), self.custom_prompts_path()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
