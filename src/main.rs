use anyhow::{bail, Context, Result};
use buildsweep::{load_manifest, reconcile_with_report, Config, ReconcileOptions, Whitelist};
use clap::Parser;
use colored::Colorize;
use humansize::{format_size, BINARY};
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prune a build output directory down to exactly the latest build's assets",
    long_about = None
)]
struct Args {
    /// Build output directory to reconcile
    output_dir: PathBuf,

    /// Asset manifest listing the fresh build's files: a JSON array, a JSON
    /// object whose keys are the asset names, or one relative path per line
    #[arg(long, short)]
    manifest: Option<PathBuf>,

    /// A fresh asset path relative to the output directory (repeatable)
    #[arg(long, short)]
    asset: Vec<String>,

    /// Extra path never to delete; relative paths resolve against the
    /// output directory (repeatable)
    #[arg(long, short)]
    keep: Vec<String>,

    /// TOML config file with files_to_keep and ignore_dotfiles
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Traverse and delete dotfiles instead of skipping them
    #[arg(long)]
    include_dotfiles: bool,

    /// Proceed even with no assets and no keep entries (removes the entire
    /// output directory)
    #[arg(long)]
    allow_empty_whitelist: bool,

    /// Show what would be removed without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Show each removed entry
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Canonicalize for exact whitelist matching; if the directory is already
    // gone, fall back to an absolute join and let reconcile report NotFound.
    let output_dir = match args.output_dir.canonicalize() {
        Ok(path) => path,
        Err(_) if args.output_dir.is_absolute() => args.output_dir.clone(),
        Err(_) => env::current_dir()
            .context("Failed to determine current directory")?
            .join(&args.output_dir),
    };

    let mut assets = match &args.manifest {
        Some(path) => load_manifest(path)?,
        None => Vec::new(),
    };
    assets.extend(args.asset.iter().cloned());

    let keep: Vec<String> = config
        .files_to_keep
        .iter()
        .chain(args.keep.iter())
        .cloned()
        .collect();

    let whitelist = Whitelist::from_assets(&output_dir, &assets, &keep)
        .context("Failed to build whitelist")?;

    if args.verbose {
        println!("Whitelist contains {} entries", whitelist.len());
    }

    if whitelist.is_empty() && !args.allow_empty_whitelist {
        bail!(
            "No assets or keep entries given; this would remove everything under {}.\n\
             Pass --manifest/--asset/--keep, or --allow-empty-whitelist to proceed.",
            output_dir.display()
        );
    }

    let options = ReconcileOptions {
        // The CLI flag wins over the config file; both default to skipping dotfiles.
        ignore_dotfiles: if args.include_dotfiles {
            false
        } else {
            config.ignore_dotfiles
        },
        dry_run: args.dry_run,
        verbose: args.verbose,
        cancel: None,
    };

    let report = reconcile_with_report(&output_dir, &whitelist, &options)
        .with_context(|| format!("Failed to reconcile {}", output_dir.display()))?;

    println!(
        "{}",
        format!("Reconciled {}", output_dir.display()).bold()
    );
    println!("  Files removed: {}", report.files_removed);
    println!("  Directories removed: {}", report.dirs_removed);
    println!("  Files kept: {}", report.files_kept);
    println!(
        "  {}",
        format!(
            "Space reclaimed: {}",
            format_size(report.bytes_reclaimed, BINARY)
        )
        .green()
    );
    if args.dry_run {
        println!("Dry run mode: No files were deleted.");
    }

    Ok(())
}
