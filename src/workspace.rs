//! Repository root discovery and the per-run path context.
//!
//! Every pipeline stage receives a [`Workspace`] carrying the absolute
//! repository root and the externals directory. Paths are threaded explicitly
//! through every backend call; the process working directory is never changed.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default directory (relative to the repository root) holding vendored
/// dependencies.
pub const DEFAULT_EXTERNALS_DIR: &str = "externals";

/// Default manifest file name, looked up at the repository root.
pub const DEFAULT_MANIFEST_FILE: &str = ".gitdeps";

/// Absolute paths for one reconciliation run.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Absolute path of the repository root (the directory containing `.git`).
    pub root: PathBuf,
    /// Absolute path of the directory holding vendored dependencies.
    pub externals_dir: PathBuf,
}

impl Workspace {
    /// Discover the enclosing git repository by walking up from `start`.
    ///
    /// The externals directory defaults to `<root>/externals`; pass
    /// `externals_dir` to override it (relative values are resolved against
    /// the root).
    pub fn discover(start: &Path, externals_dir: Option<&Path>) -> Result<Self> {
        let root = find_repo_root(start).ok_or_else(|| Error::NoRepository {
            start: start.to_path_buf(),
        })?;

        let externals_dir = match externals_dir {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => root.join(dir),
            None => root.join(DEFAULT_EXTERNALS_DIR),
        };

        Ok(Self {
            root,
            externals_dir,
        })
    }

    /// Absolute path of the manifest file at the repository root.
    pub fn default_manifest_path(&self) -> PathBuf {
        self.root.join(DEFAULT_MANIFEST_FILE)
    }

    /// Ideal directory for a named dependency: `externalsDir/name`.
    pub fn dependency_dir(&self, name: &str) -> PathBuf {
        self.externals_dir.join(name)
    }

    /// Express an absolute dependency directory relative to the repository
    /// root, as git commands expect.
    pub fn rel_dir<'a>(&self, directory: &'a Path) -> Result<&'a Path> {
        directory
            .strip_prefix(&self.root)
            .map_err(|_| Error::Path {
                message: format!(
                    "{} is outside the repository root {}",
                    directory.display(),
                    self.root.display()
                ),
            })
    }
}

/// Search upward from `start` for a directory containing `.git`.
fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
