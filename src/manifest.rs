//! Asset manifest loading for the CLI front end.
//!
//! Bundlers express "the files this build produced" in a few shapes: a JSON
//! array of relative paths, a JSON object whose keys are the asset names
//! (the webpack `compilation.assets` convention), or a plain text list with
//! one path per line. All three resolve to the same thing here: a list of
//! paths relative to the output directory.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// JSON manifest shapes accepted by `--manifest`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonManifest {
    /// `["app.js", "app.css"]`
    List(Vec<String>),
    /// `{"app.js": "...", "app.css": "..."}` — keys are the asset names,
    /// values are ignored (hashes, output paths, whatever the tool emits).
    Map(serde_json::Map<String, Value>),
}

/// Load the fresh asset list from a manifest file. The format is chosen by
/// extension: `.json` parses as JSON, anything else as a line-oriented text
/// list (blank lines and `#` comments skipped).
pub fn load_manifest(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let assets = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        parse_json_manifest(&content)
            .with_context(|| format!("Failed to parse JSON manifest {}", path.display()))?
    } else {
        parse_text_manifest(&content)
    };

    if assets.iter().any(|a| a.is_empty()) {
        bail!("Manifest {} contains an empty asset name", path.display());
    }
    Ok(assets)
}

fn parse_json_manifest(content: &str) -> Result<Vec<String>> {
    let manifest: JsonManifest = serde_json::from_str(content)?;
    Ok(match manifest {
        JsonManifest::List(entries) => entries,
        JsonManifest::Map(map) => map.keys().cloned().collect(),
    })
}

fn parse_text_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
