//! # Sync Command Implementation
//!
//! The `sync` subcommand runs the full reconciliation pipeline:
//!
//! 1. Discover the enclosing git repository and load the `.gitdeps` manifest.
//! 2. Scan the working tree for currently registered dependencies, cleaning
//!    up orphaned registrations.
//! 3. Diff manifest against actual state, resolve requested commit-ishes to
//!    concrete hashes, and classify the result into stay/update/create/remove.
//! 4. Print the plan, then apply it: removals (safety-checked), additions,
//!    checkouts, in that order.
//! 5. Repoint declared symlinks and prune dangling ones tree-wide.
//!
//! With `--dry-run` the plan is computed and printed (including commit
//! resolution, which may fetch) but nothing is applied.

use anyhow::{Context, Result};
use clap::Args;
use std::env;
use std::path::PathBuf;

use gitdeps::git::SystemGit;
use gitdeps::plan::Plan;
use gitdeps::workspace::Workspace;
use gitdeps::{execute, links, manifest, plan, resolve, scan};

/// Reconcile vendored dependencies against the manifest
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the manifest file.
    ///
    /// Defaults to `.gitdeps` at the repository root.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Directory holding vendored dependencies, relative to the repository
    /// root. Can also be set with the `GITDEPS_EXTERNALS` environment
    /// variable.
    #[arg(long, value_name = "DIR", env = "GITDEPS_EXTERNALS")]
    pub externals_dir: Option<PathBuf>,

    /// Compute and print the plan without applying anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs) -> Result<()> {
    let cwd = env::current_dir()?;
    let workspace = Workspace::discover(&cwd, args.externals_dir.as_deref())?;

    let manifest_path = match args.manifest {
        Some(path) if path.is_absolute() => path,
        Some(path) => cwd.join(path),
        None => workspace.default_manifest_path(),
    };
    let entries = manifest::load(&manifest_path, &workspace)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

    let backend = SystemGit::new();

    let actual = scan::scan(&backend, &workspace)?;
    let raw = plan::diff(&entries, actual, &workspace);
    let (resolved, unresolved) = resolve::resolve_candidates(&backend, raw.candidates)?;
    let (stay, update) = plan::classify(resolved);

    let plan = Plan {
        stay,
        update,
        create: raw.create,
        remove: raw.remove,
        unresolved,
    };

    println!("Plan for {}:", workspace.root.display());
    print!("{}", plan.render());

    if args.dry_run {
        println!("Dry run - nothing applied.");
        return Ok(());
    }

    execute::apply(&backend, &plan, &workspace)?;
    links::sync_links(&plan, &workspace)?;
    let pruned = links::prune_dangling(&workspace)?;

    if plan.is_noop() && pruned.is_empty() {
        println!("Already up to date.");
    } else {
        println!(
            "Synchronized {} dependencies ({} removed, {} pruned links).",
            plan.stay.len() + plan.update.len() + plan.create.len(),
            plan.remove.len(),
            pruned.len()
        );
    }

    Ok(())
}
