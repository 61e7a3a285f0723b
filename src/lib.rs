//! buildsweep - Build Output Reconciler
//!
//! buildsweep prunes a build output directory down to exactly the files the
//! most recent build produced. Output directories accumulate stale artifacts
//! across repeated builds (renamed bundles, removed chunks, old source maps);
//! given the fresh asset list, buildsweep deletes every file not on it and
//! collapses any directory left empty as a result, bottom-up, including the
//! output directory itself.
//!
//! The core is [`reconcile`]: a single-threaded, depth-first pass that
//! classifies each entry as keep (exact whitelist member), recurse
//! (subdirectory), or delete, with dotfiles optionally exempt from both
//! deletion and traversal. Errors propagate on first failure; there is no
//! retry and no rollback.

pub mod config;
pub mod error;
pub mod manifest;
pub mod reconcile;
pub mod whitelist;

// Re-export commonly used items
pub use config::Config;
pub use error::ReconcileError;
pub use manifest::load_manifest;
pub use reconcile::{reconcile, reconcile_with_report, ReconcileOptions, ReconcileReport};
pub use whitelist::Whitelist;
