//! # Plan Executor
//!
//! Applies the classified plan in a fixed phase order: remove, then create,
//! then update. Freeing directory slots before creating new ones avoids path
//! collisions when a dependency is renamed onto a path another entry is
//! vacating. Within a phase, entries are applied strictly in order and the
//! first failure aborts the run.
//!
//! Removal is safety-gated: the dependency's tree must be clean and must have
//! no unpushed commits on tracking branches. The two checks are read-only and
//! independent, so they are issued concurrently; either violation aborts the
//! run before anything is deleted.

use log::info;

use crate::error::{Error, Result};
use crate::git::GitBackend;
use crate::plan::{Plan, PlanEntry};
use crate::workspace::Workspace;

/// Apply the plan against the working tree.
pub fn apply(backend: &dyn GitBackend, plan: &Plan, workspace: &Workspace) -> Result<()> {
    for entry in &plan.remove {
        remove_one(backend, entry, workspace)?;
    }

    for entry in &plan.create {
        info!("Adding {} at {}...", entry.name, entry.directory.display());
        let rel = workspace.rel_dir(&entry.directory)?;
        backend.add_submodule(&workspace.root, &entry.url, rel)?;
    }

    for entry in &plan.update {
        // The resolver drops any entry it could not resolve, so classified
        // updates always carry a concrete hash.
        let Some(commit) = entry.resolved.as_deref() else {
            continue;
        };
        info!(
            "Updating {} to {} ({})...",
            entry.name,
            entry.requested,
            &commit[..commit.len().min(7)]
        );
        backend.checkout(&entry.directory, commit)?;
    }

    Ok(())
}

/// Safety-checked removal of one dependency.
fn remove_one(backend: &dyn GitBackend, entry: &PlanEntry, workspace: &Workspace) -> Result<()> {
    info!("Removing {}...", entry.directory.display());

    let dir = entry.directory.as_path();
    let (clean, unpushed) = rayon::join(
        || backend.is_clean(dir),
        || backend.has_unpushed_commits(dir),
    );

    if !clean? {
        return Err(Error::DirtyTree {
            directory: entry.directory.clone(),
        });
    }
    if unpushed? {
        return Err(Error::UnpushedCommits {
            directory: entry.directory.clone(),
        });
    }

    let rel = workspace.rel_dir(&entry.directory)?;
    backend.deregister(&workspace.root, rel)?;
    backend.remove_tree(&entry.directory)?;
    Ok(())
}
