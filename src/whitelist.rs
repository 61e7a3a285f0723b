//! The set of absolute file paths that must survive a reconciliation pass.

use crate::error::ReconcileError;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Immutable whitelist of absolute paths to retain. Membership is an exact
/// path match, never a pattern match. Built once per invocation from the
/// fresh asset list plus any "always keep" entries.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    paths: HashSet<PathBuf>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a whitelist from asset names relative to the output root plus
    /// extra keep entries. Relative keep entries are resolved against the
    /// root; absolute entries are used as-is.
    pub fn from_assets<A, K>(root: &Path, assets: A, keep: K) -> Result<Self, ReconcileError>
    where
        A: IntoIterator,
        A::Item: AsRef<Path>,
        K: IntoIterator,
        K::Item: AsRef<Path>,
    {
        if !root.is_absolute() {
            return Err(ReconcileError::InvalidInput {
                path: root.to_path_buf(),
                reason: "output root must be an absolute path".to_string(),
            });
        }

        let mut whitelist = Whitelist::new();
        for asset in assets {
            whitelist
                .paths
                .insert(normalize_lexically(&root.join(asset.as_ref())));
        }
        for entry in keep {
            whitelist.insert_keep(root, entry.as_ref())?;
        }
        Ok(whitelist)
    }

    /// Add one "always keep" entry, resolving relative paths against `root`.
    pub fn insert_keep(&mut self, root: &Path, entry: &Path) -> Result<(), ReconcileError> {
        if entry.as_os_str().is_empty() {
            return Err(ReconcileError::InvalidInput {
                path: entry.to_path_buf(),
                reason: "keep entry is empty".to_string(),
            });
        }
        let absolute = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            root.join(entry)
        };
        self.paths.insert(normalize_lexically(&absolute));
        Ok(())
    }

    /// Add an already-absolute path directly.
    pub fn insert(&mut self, path: PathBuf) -> Result<(), ReconcileError> {
        if !path.is_absolute() {
            return Err(ReconcileError::InvalidInput {
                path,
                reason: "whitelist entries must be absolute paths".to_string(),
            });
        }
        self.paths.insert(normalize_lexically(&path));
        Ok(())
    }

    /// Exact membership test.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

/// Collapse `.` and `..` segments lexically, the way Node's `path.join`
/// does, so `dist/../app.js` stores the same path the traversal will see.
/// `..` at an absolute root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
