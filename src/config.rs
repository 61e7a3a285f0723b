//! Optional TOML configuration for the CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration surface recognized from a TOML file:
///
/// ```toml
/// files_to_keep = ["stats.json", "reports/coverage.html"]
/// ignore_dotfiles = true
/// ```
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Extra absolute-or-relative paths never to delete.
    #[serde(default)]
    pub files_to_keep: Vec<String>,
    /// Whether dotfiles and dot-directories are exempt from both deletion
    /// and traversal.
    #[serde(default = "default_ignore_dotfiles")]
    pub ignore_dotfiles: bool,
}

fn default_ignore_dotfiles() -> bool {
    true
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}
