//! # Commit Resolver
//!
//! Turns each update candidate's requested commit-ish into a concrete commit
//! hash.
//!
//! Branches move, so a branch name always triggers a fetch of all remotes
//! before resolution; a branch that still cannot be resolved afterwards is a
//! hard error. Tags and raw hashes are immutable: they are resolved directly,
//! and on a miss (e.g. a tag that exists only on the remote) all remotes are
//! fetched and resolution retried exactly once. A second miss excludes the
//! entry from the update set; the run continues and the miss is reported in
//! the plan instead of blocking unrelated entries. Fetch failures are always
//! fatal.
//!
//! Candidates are resolved one at a time. Concurrent fetches against
//! submodules of one working tree contend on shared git metadata, and the
//! sequential order keeps the log deterministic.

use log::{info, warn};

use crate::error::{Error, Result};
use crate::git::{GitBackend, RefKind};
use crate::plan::{PlanEntry, Unresolved};

/// Resolve every candidate, returning the resolved entries and the misses.
pub fn resolve_candidates(
    backend: &dyn GitBackend,
    candidates: Vec<PlanEntry>,
) -> Result<(Vec<PlanEntry>, Vec<Unresolved>)> {
    let mut resolved = Vec::with_capacity(candidates.len());
    let mut unresolved = Vec::new();

    for mut entry in candidates {
        match resolve_one(backend, &mut entry)? {
            true => resolved.push(entry),
            false => {
                warn!(
                    "{}: {} not found after fetching; skipping",
                    entry.directory.display(),
                    entry.requested
                );
                unresolved.push(Unresolved {
                    name: entry.name,
                    requested: entry.requested,
                    directory: entry.directory,
                });
            }
        }
    }

    Ok((resolved, unresolved))
}

/// Resolve a single candidate in place. `Ok(false)` is a soft miss.
fn resolve_one(backend: &dyn GitBackend, entry: &mut PlanEntry) -> Result<bool> {
    let dir = entry.directory.clone();

    match backend.ref_kind(&dir, &entry.requested)? {
        RefKind::Branch => {
            info!(
                "{}: {} is a branch; fetching remotes for updates",
                dir.display(),
                entry.requested
            );
            backend.fetch_all(&dir)?;
            match backend.resolve(&dir, &entry.requested)? {
                Some(hash) => {
                    entry.resolved = Some(hash);
                    Ok(true)
                }
                None => Err(Error::BranchResolve {
                    name: entry.requested.clone(),
                    directory: dir,
                }),
            }
        }
        RefKind::Tag | RefKind::Detached => {
            if let Some(hash) = backend.resolve(&dir, &entry.requested)? {
                entry.resolved = Some(hash);
                return Ok(true);
            }

            // Not known locally; the ref may only exist on the remote.
            backend.fetch_all(&dir)?;
            match backend.resolve(&dir, &entry.requested)? {
                Some(hash) => {
                    entry.resolved = Some(hash);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}
