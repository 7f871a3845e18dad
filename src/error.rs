//! # Error Handling
//!
//! Centralized error type for `gitdeps`, built on `thiserror`. Every failure
//! mode the pipeline can hit is a variant here, carrying enough context
//! (directory, command, stderr) to make the terminal message actionable.
//!
//! The taxonomy follows the reconciliation design:
//!
//! - Configuration errors (`ManifestMissing`, `ManifestParse`,
//!   `NoRepository`, `DuplicateDirectory`) are fatal and reported before any
//!   mutation occurs.
//! - Backend command failures (`GitCommand`) are fatal to the entire run.
//! - Safety violations (`DirtyTree`, `UnpushedCommits`) abort the run before
//!   anything is deleted.
//! - Resolution misses and symlink conflicts are *not* errors: they are soft
//!   failures surfaced as warnings by the pipeline, never through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for gitdeps operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No `.git` directory was found at the starting path or any parent.
    #[error("No git repository found at {} or any parent directory", start.display())]
    NoRepository { start: PathBuf },

    /// The manifest file does not exist.
    #[error("No manifest found at {}", path.display())]
    ManifestMissing { path: PathBuf },

    /// The manifest file exists but could not be parsed.
    #[error("Could not parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// Two manifest entries resolve to the same target directory.
    #[error("Duplicate manifest entries for directory {}", directory.display())]
    DuplicateDirectory { directory: PathBuf },

    /// A git invocation failed.
    #[error("git {command} failed in {dir}: {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// A branch name could not be resolved even after fetching all remotes.
    ///
    /// Branch misses are fatal, unlike tag/hash misses: a tracked branch that
    /// no remote knows about means the manifest and the remotes disagree.
    #[error("Branch {name} could not be resolved in {} after fetching", directory.display())]
    BranchResolve { name: String, directory: PathBuf },

    /// Removal refused: the dependency's working tree has uncommitted changes.
    #[error("{} is not clean; refusing to remove it", directory.display())]
    DirtyTree { directory: PathBuf },

    /// Removal refused: the dependency has commits not pushed to any remote.
    #[error("{} has unpushed commits; refusing to remove it", directory.display())]
    UnpushedCommits { directory: PathBuf },

    /// A path could not be interpreted (non-UTF-8 output, broken prefix).
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
