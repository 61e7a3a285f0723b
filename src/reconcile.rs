//! The recursive prune-and-collapse pass over a build output directory.

use crate::error::ReconcileError;
use crate::whitelist::Whitelist;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options controlling a reconciliation pass (runtime flags)
#[derive(Clone)]
pub struct ReconcileOptions {
    /// Skip entries whose name starts with `.` entirely: never recursed
    /// into, never deleted, and they keep their parent directory alive.
    pub ignore_dotfiles: bool,
    /// Report what would be removed without touching the filesystem.
    pub dry_run: bool,
    /// Print a line per removed entry.
    pub verbose: bool,
    /// Checked at entry to each directory; when set, the pass stops with
    /// `ReconcileError::Cancelled`. Already-deleted entries stay deleted.
    pub cancel: Option<Arc<AtomicBool>>,
}

// Manual impl: the safe default is to leave dotfiles alone, so Default must
// not fall back to `false` for ignore_dotfiles.
impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            ignore_dotfiles: true,
            dry_run: false,
            verbose: false,
            cancel: None,
        }
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub files_removed: u64,
    pub dirs_removed: u64,
    pub files_kept: u64,
    pub bytes_reclaimed: u64,
}

/// Prune `directory` down to exactly the whitelisted files (modulo dotfile
/// exclusion), then collapse directories left empty, including `directory`
/// itself. The effect is purely on the filesystem; see
/// [`reconcile_with_report`] for the summarizing variant.
pub fn reconcile(
    directory: &Path,
    whitelist: &Whitelist,
    options: &ReconcileOptions,
) -> Result<(), ReconcileError> {
    reconcile_with_report(directory, whitelist, options).map(|_| ())
}

/// Like [`reconcile`], returning counts of what was removed and kept.
pub fn reconcile_with_report(
    directory: &Path,
    whitelist: &Whitelist,
    options: &ReconcileOptions,
) -> Result<ReconcileReport, ReconcileError> {
    let metadata =
        fs::symlink_metadata(directory).map_err(|e| ReconcileError::from_io(e, directory))?;
    if !metadata.is_dir() {
        return Err(ReconcileError::InvalidInput {
            path: directory.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut report = ReconcileReport::default();
    prune_directory(directory, whitelist, options, &mut report)?;
    Ok(report)
}

/// Process one directory level: delete non-whitelisted files, recurse into
/// subdirectories, then remove the directory itself if it ended up empty.
/// Returns true if the directory was removed (or would be, in dry-run), so
/// the parent can count it against its own emptiness.
fn prune_directory(
    directory: &Path,
    whitelist: &Whitelist,
    options: &ReconcileOptions,
    report: &mut ReconcileReport,
) -> Result<bool, ReconcileError> {
    if let Some(cancel) = &options.cancel {
        if cancel.load(Ordering::Relaxed) {
            return Err(ReconcileError::Cancelled);
        }
    }

    // Survivor count drives the dry-run emptiness simulation; real runs
    // re-list the directory below instead.
    let mut survivors = 0usize;

    let entries = fs::read_dir(directory).map_err(|e| ReconcileError::from_io(e, directory))?;
    for entry in entries {
        let entry = entry.map_err(|e| ReconcileError::from_io(e, directory))?;

        if options.ignore_dotfiles && entry.file_name().to_string_lossy().starts_with('.') {
            survivors += 1;
            continue;
        }

        let path = entry.path();
        // symlink_metadata so symlinks are never followed; a link to a
        // directory is treated as a plain deletable entry.
        let metadata =
            fs::symlink_metadata(&path).map_err(|e| ReconcileError::from_io(e, &path))?;

        if metadata.is_dir() {
            // Pre-order: the subtree is pruned to completion before this
            // directory's own emptiness check.
            if !prune_directory(&path, whitelist, options, report)? {
                survivors += 1;
            }
        } else if whitelist.contains(&path) {
            report.files_kept += 1;
            survivors += 1;
        } else {
            report.files_removed += 1;
            report.bytes_reclaimed += metadata.len();
            if options.dry_run {
                println!("Would remove: {}", path.display());
            } else {
                fs::remove_file(&path).map_err(|e| ReconcileError::from_io(e, &path))?;
                if options.verbose {
                    println!("Removed: {}", path.display());
                }
            }
        }
    }

    if options.dry_run {
        if survivors == 0 {
            println!("Would remove directory: {}", directory.display());
            report.dirs_removed += 1;
            return Ok(true);
        }
        return Ok(false);
    }

    // Re-list rather than trust the survivor count: only physical emptiness
    // justifies removal, and a concurrent writer surfaces as NotEmpty.
    let mut remaining =
        fs::read_dir(directory).map_err(|e| ReconcileError::from_io(e, directory))?;
    if remaining.next().is_none() {
        fs::remove_dir(directory).map_err(|e| ReconcileError::from_io(e, directory))?;
        if options.verbose {
            println!("Removed directory: {}", directory.display());
        }
        report.dirs_removed += 1;
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn opts() -> ReconcileOptions {
        ReconcileOptions::new()
    }

    #[test]
    fn default_options_skip_dotfiles() {
        assert!(ReconcileOptions::default().ignore_dotfiles);
        assert!(ReconcileOptions::new().ignore_dotfiles);
    }

    #[test]
    fn default_options_preserve_dotfiles_on_disk() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join(".env"), "SECRET=1").unwrap();
        fs::write(out.join("stale.js"), "x").unwrap();

        reconcile(&out, &Whitelist::new(), &ReconcileOptions::default()).unwrap();

        assert!(out.join(".env").exists());
        assert!(!out.join("stale.js").exists());
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("never-built");
        let err = reconcile(&gone, &Whitelist::new(), &opts()).unwrap_err();
        assert!(matches!(err, ReconcileError::NotFound { .. }));
    }

    #[test]
    fn file_root_is_invalid_input() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bundle.js");
        fs::write(&file, "js").unwrap();
        let err = reconcile(&file, &Whitelist::new(), &opts()).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput { .. }));
    }

    #[test]
    fn deletes_everything_with_empty_whitelist() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("a.js"), "a").unwrap();
        fs::create_dir(out.join("sub")).unwrap();
        fs::write(out.join("sub/b.js"), "b").unwrap();

        let report = reconcile_with_report(&out, &Whitelist::new(), &opts()).unwrap();

        assert!(!out.exists());
        assert_eq!(report.files_removed, 2);
        // sub plus the root itself
        assert_eq!(report.dirs_removed, 2);
    }

    #[test]
    fn counts_bytes_reclaimed() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("stale.bin"), vec![0u8; 1024]).unwrap();
        let keep = out.join("fresh.bin");
        fs::write(&keep, vec![0u8; 512]).unwrap();

        let mut wl = Whitelist::new();
        wl.insert(keep).unwrap();

        let report = reconcile_with_report(&out, &wl, &opts()).unwrap();
        assert_eq!(report.bytes_reclaimed, 1024);
        assert_eq!(report.files_kept, 1);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("stale.js"), "x").unwrap();
        fs::create_dir(out.join("old")).unwrap();
        fs::write(out.join("old/dead.js"), "y").unwrap();

        let options = ReconcileOptions {
            dry_run: true,
            ..opts()
        };
        let report = reconcile_with_report(&out, &Whitelist::new(), &options).unwrap();

        assert!(out.join("stale.js").exists());
        assert!(out.join("old/dead.js").exists());
        assert_eq!(report.files_removed, 2);
        assert_eq!(report.dirs_removed, 2);
    }

    #[test]
    fn dry_run_dotfile_keeps_directory_alive() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::create_dir(out.join("cache")).unwrap();
        fs::write(out.join("cache/.marker"), "").unwrap();
        fs::write(out.join("cache/stale.js"), "x").unwrap();

        let options = ReconcileOptions {
            dry_run: true,
            ..opts()
        };
        let report = reconcile_with_report(&out, &Whitelist::new(), &options).unwrap();

        // cache would lose stale.js but .marker keeps it (and the root) alive
        assert_eq!(report.files_removed, 1);
        assert_eq!(report.dirs_removed, 0);
    }

    #[test]
    fn cancellation_stops_before_descending() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("stale.js"), "x").unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let options = ReconcileOptions {
            cancel: Some(cancel),
            ..opts()
        };
        let err = reconcile(&out, &Whitelist::new(), &options).unwrap_err();
        assert!(matches!(err, ReconcileError::Cancelled));
        assert!(out.join("stale.js").exists());
    }
}
