//! # Manifest Loading
//!
//! The `.gitdeps` manifest is a JSON array describing the desired set of
//! vendored dependencies:
//!
//! ```json
//! [
//!     {
//!         "name": "foo",
//!         "url": "git@example.com:vendor/foo.git",
//!         "commit": "v1.2.0",
//!         "symlinks": [{"link": "lib/foo", "target": "dist"}]
//!     }
//! ]
//! ```
//!
//! `commit` may be a branch name, tag name, or raw hash and defaults to
//! `"master"` when absent. `symlinks` is optional. Each entry maps to exactly
//! one directory under the externals dir; two entries naming the same
//! directory are rejected as a configuration error rather than silently
//! tie-broken.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::workspace::Workspace;

/// One desired dependency, as declared in the manifest.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Dependency name; also the directory name under the externals dir.
    pub name: String,
    /// Clone URL for the dependency's repository.
    pub url: String,
    /// Requested commit-ish: branch, tag, or raw hash.
    #[serde(default = "default_commit")]
    pub commit: String,
    /// Symbolic links to maintain into the dependency's tree.
    #[serde(default)]
    pub symlinks: Vec<SymlinkSpec>,
}

/// A declared symlink from the repository tree into a dependency.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SymlinkSpec {
    /// Link location, relative to the repository root.
    pub link: String,
    /// Optional path inside the dependency directory to point at.
    #[serde(default)]
    pub target: Option<String>,
}

fn default_commit() -> String {
    "master".to_string()
}

/// Load and validate the manifest at `path`.
///
/// Fails if the file is absent or malformed, or if two entries map to the
/// same target directory.
pub fn load(path: &Path, workspace: &Workspace) -> Result<Vec<ManifestEntry>> {
    if !path.exists() {
        return Err(Error::ManifestMissing {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(&content).map_err(|e| Error::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut seen = HashSet::new();
    for entry in &entries {
        let directory = workspace.dependency_dir(&entry.name);
        if !seen.insert(directory.clone()) {
            return Err(Error::DuplicateDirectory { directory });
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let ws = Workspace::discover(temp.path(), None).unwrap();
        (temp, ws)
    }

    fn write_manifest(temp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = temp.path().join(".gitdeps");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_full_entry() {
        let (temp, ws) = fixture();
        let path = write_manifest(
            &temp,
            r#"[{
                "name": "foo",
                "url": "git@example.com:vendor/foo.git",
                "commit": "v1.2.0",
                "symlinks": [{"link": "lib/foo", "target": "dist"}]
            }]"#,
        );

        let entries = load(&path, &ws).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "foo");
        assert_eq!(entries[0].commit, "v1.2.0");
        assert_eq!(entries[0].symlinks.len(), 1);
        assert_eq!(entries[0].symlinks[0].link, "lib/foo");
        assert_eq!(entries[0].symlinks[0].target.as_deref(), Some("dist"));
    }

    #[test]
    fn test_load_defaults() {
        let (temp, ws) = fixture();
        let path = write_manifest(&temp, r#"[{"name": "foo", "url": "u"}]"#);

        let entries = load(&path, &ws).unwrap();
        assert_eq!(entries[0].commit, "master");
        assert!(entries[0].symlinks.is_empty());

        let link = write_manifest(
            &temp,
            r#"[{"name": "foo", "url": "u", "symlinks": [{"link": "lib/foo"}]}]"#,
        );
        let entries = load(&link, &ws).unwrap();
        assert_eq!(entries[0].symlinks[0].target, None);
    }

    #[test]
    fn test_load_missing_file() {
        let (temp, ws) = fixture();
        let err = load(&temp.path().join(".gitdeps"), &ws).unwrap_err();
        assert!(matches!(err, Error::ManifestMissing { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let (temp, ws) = fixture();
        let path = write_manifest(&temp, "[{not json");
        let err = load(&path, &ws).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_load_duplicate_directory() {
        let (temp, ws) = fixture();
        let path = write_manifest(
            &temp,
            r#"[{"name": "foo", "url": "a"}, {"name": "foo", "url": "b"}]"#,
        );
        let err = load(&path, &ws).unwrap_err();
        match err {
            Error::DuplicateDirectory { directory } => {
                assert!(directory.ends_with("externals/foo"));
            }
            other => panic!("expected DuplicateDirectory, got {other}"),
        }
    }

    #[test]
    fn test_load_empty_manifest() {
        let (temp, ws) = fixture();
        let path = write_manifest(&temp, "[]");
        assert!(load(&path, &ws).unwrap().is_empty());
    }
}
