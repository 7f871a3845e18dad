//! # Symlink Synchronizer
//!
//! Keeps declared symlinks pointing into the materialized dependency trees.
//! For every entry that still exists after execution, each declared link
//! (`repoRoot/link` -> `externalsDir/name[/target]`) is created as a relative
//! symlink. A pre-existing symlink at the link path is replaced (assumed to
//! have been made by a previous run); a real file or directory is never
//! overwritten: the conflict is logged and the link skipped.
//!
//! Afterwards a tree-wide sweep from the repository root deletes symlinks
//! whose target no longer exists, pruning links left behind by removed or
//! renamed dependencies.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{error, info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::plan::Plan;
use crate::workspace::Workspace;

/// Create or repoint declared symlinks for every surviving plan entry.
pub fn sync_links(plan: &Plan, workspace: &Workspace) -> Result<()> {
    for entry in plan.surviving() {
        for spec in &entry.symlinks {
            let source = workspace.root.join(&spec.link);
            let mut destination = workspace.dependency_dir(&entry.name);
            if let Some(target) = &spec.target {
                destination = destination.join(target);
            }
            make_link(&source, &destination)?;
        }
    }
    Ok(())
}

/// Create a relative symlink at `source` pointing to `destination`.
fn make_link(source: &Path, destination: &Path) -> Result<()> {
    let parent = source.parent().unwrap_or(Path::new("."));

    match fs::symlink_metadata(source) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(source)?;
        }
        Ok(_) => {
            error!(
                "Cannot make symlink: file already exists at {}",
                source.display()
            );
            return Ok(());
        }
        Err(_) => {}
    }

    fs::create_dir_all(parent)?;
    let relative = relative_path(parent, destination);
    info!(
        "Linking {} -> {}",
        source.display(),
        relative.display()
    );
    std::os::unix::fs::symlink(&relative, source)?;
    Ok(())
}

/// Delete symlinks under the repository root whose target no longer exists.
///
/// Returns the paths that were removed. The `.git` directory is left alone.
pub fn prune_dangling(workspace: &Workspace) -> Result<Vec<PathBuf>> {
    let mut pruned = Vec::new();

    let walker = WalkDir::new(&workspace.root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable path during prune: {err}");
                continue;
            }
        };
        if !entry.path_is_symlink() {
            continue;
        }
        // fs::metadata follows the link; failure means the target is gone.
        if fs::metadata(entry.path()).is_err() {
            warn!("Removing broken symlink {}", entry.path().display());
            fs::remove_file(entry.path())?;
            pruned.push(entry.path().to_path_buf());
        }
    }

    Ok(pruned)
}

/// Express `to` relative to the directory `from`. Both must be absolute.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let mut from_components = from.components().peekable();
    let mut to_components = to.components().peekable();

    while let (Some(a), Some(b)) = (from_components.peek(), to_components.peek()) {
        if a != b {
            break;
        }
        from_components.next();
        to_components.next();
    }

    let mut result = PathBuf::new();
    for component in from_components {
        if component != Component::RootDir {
            result.push("..");
        }
    }
    for component in to_components {
        result.push(component);
    }

    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}
