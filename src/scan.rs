//! # Actual-State Scanner
//!
//! Enumerates the dependency entries currently registered in the working
//! tree. Entries whose directory is missing from disk are orphans: their
//! backend bookkeeping is removed eagerly (there is nothing on disk to
//! protect, so no safety checks apply) and they are excluded from the result,
//! so the planner sees them as already removed.

use std::path::PathBuf;

use log::warn;

use crate::error::Result;
use crate::git::GitBackend;
use crate::workspace::Workspace;

/// One dependency as materialized in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualEntry {
    /// Absolute path of the dependency's directory.
    pub directory: PathBuf,
    /// URL of the dependency's configured remote.
    pub remote_url: String,
    /// Currently checked-out commit hash.
    pub head: String,
}

/// Scan the working tree for registered dependencies.
pub fn scan(backend: &dyn GitBackend, workspace: &Workspace) -> Result<Vec<ActualEntry>> {
    let mut entries = Vec::new();

    for status in backend.list_submodules(&workspace.root)? {
        let directory = workspace.root.join(&status.directory);

        if !directory.exists() {
            warn!(
                "{} is registered but missing from disk; deregistering",
                directory.display()
            );
            backend.deregister(&workspace.root, &status.directory)?;
            continue;
        }

        let remote_url = backend.remote_url(&directory)?;
        entries.push(ActualEntry {
            directory,
            remote_url,
            head: status.head,
        });
    }

    Ok(entries)
}
