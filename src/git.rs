//! # Repository Backend
//!
//! Abstraction over the version-control operations the reconciliation engine
//! needs, plus the production implementation that shells out to the system
//! `git` binary.
//!
//! Using the system git means SSH keys, credential helpers and everything
//! else in `~/.gitconfig` work without any configuration of our own. Every
//! invocation receives an explicit working directory; the process-wide
//! current directory is never changed.
//!
//! The engine consumes the backend through the [`GitBackend`] trait so the
//! pipeline can be exercised against a scripted fake in tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Kind of reference a commit-ish name denotes, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A local or remote-tracking branch head. Branches move, so resolution
    /// must fetch first.
    Branch,
    /// A tag.
    Tag,
    /// Not a named reference: a raw hash, or a name with no ref at all.
    Detached,
}

/// One registered submodule as reported by `git submodule status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleStatus {
    /// Currently checked-out commit hash.
    pub head: String,
    /// Directory relative to the repository root.
    pub directory: PathBuf,
}

/// Version-control operations consumed by the reconciliation engine.
///
/// All methods take explicit directories. `Sync` is required because the two
/// read-only safety checks before a removal are issued concurrently.
pub trait GitBackend: Sync {
    /// List all registered submodules under `root`.
    fn list_submodules(&self, root: &Path) -> Result<Vec<SubmoduleStatus>>;

    /// Remote URL configured for the repository at `dir`.
    fn remote_url(&self, dir: &Path) -> Result<String>;

    /// Classify what kind of reference `name` denotes inside `dir`.
    fn ref_kind(&self, dir: &Path, name: &str) -> Result<RefKind>;

    /// Resolve `name` to a full commit hash inside `dir`.
    ///
    /// `Ok(None)` means the name is unknown locally (a soft miss); `Err`
    /// means the backend itself failed.
    fn resolve(&self, dir: &Path, name: &str) -> Result<Option<String>>;

    /// Fetch all remotes (and tags) for the repository at `dir`.
    fn fetch_all(&self, dir: &Path) -> Result<()>;

    /// Whether the working tree at `dir` has no uncommitted modifications.
    fn is_clean(&self, dir: &Path) -> Result<bool>;

    /// Whether any tracking branch at `dir` has commits ahead of its remote.
    fn has_unpushed_commits(&self, dir: &Path) -> Result<bool>;

    /// Register and clone a new submodule at `directory` (relative to root).
    fn add_submodule(&self, root: &Path, url: &str, directory: &Path) -> Result<()>;

    /// Detach the repository at `dir` at exactly `commit`.
    fn checkout(&self, dir: &Path, commit: &str) -> Result<()>;

    /// Remove submodule bookkeeping for `directory` (relative to root):
    /// `.gitmodules` section, local config section, and the index entry.
    /// Performs no safety checks and does not touch the working tree.
    fn deregister(&self, root: &Path, directory: &Path) -> Result<()>;

    /// Recursively delete `path`. Missing paths are not an error.
    fn remove_tree(&self, path: &Path) -> Result<()>;
}

/// Production backend invoking the system `git` binary.
#[derive(Debug, Default)]
pub struct SystemGit;

impl SystemGit {
    pub fn new() -> Self {
        Self
    }

    /// Run git with `args` in `dir`, returning stdout on success.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| Error::GitCommand {
                command: args.join(" "),
                dir: dir.display().to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::GitCommand {
                command: args.join(" "),
                dir: dir.display().to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Like `run`, but a nonzero exit is reported as `Ok(None)` instead of an
    /// error. Used where "not found" is an answer, not a failure.
    fn run_soft(&self, dir: &Path, args: &[&str]) -> Result<Option<String>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| Error::GitCommand {
                command: args.join(" "),
                dir: dir.display().to_string(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        } else {
            Ok(None)
        }
    }
}

impl GitBackend for SystemGit {
    fn list_submodules(&self, root: &Path) -> Result<Vec<SubmoduleStatus>> {
        let stdout = self.run(root, &["submodule", "status"])?;
        Ok(parse_submodule_status(&stdout))
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        let stdout = self.run(dir, &["remote", "-v"])?;
        parse_remote_url(&stdout).ok_or_else(|| Error::GitCommand {
            command: "remote -v".to_string(),
            dir: dir.display().to_string(),
            stderr: "no remotes configured".to_string(),
        })
    }

    fn ref_kind(&self, dir: &Path, name: &str) -> Result<RefKind> {
        // show-ref exits nonzero for raw hashes and unknown names; both are
        // Detached as far as the resolver is concerned.
        match self.run_soft(dir, &["show-ref", name])? {
            Some(stdout) => Ok(classify_show_ref(&stdout)),
            None => Ok(RefKind::Detached),
        }
    }

    fn resolve(&self, dir: &Path, name: &str) -> Result<Option<String>> {
        let spec = format!("{name}^{{commit}}");
        let stdout = self.run_soft(dir, &["rev-parse", "--verify", "--quiet", &spec])?;
        Ok(stdout.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
    }

    fn fetch_all(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["fetch", "--all", "--tags", "--quiet"])?;
        Ok(())
    }

    fn is_clean(&self, dir: &Path) -> Result<bool> {
        let stdout = self.run(dir, &["status", "--porcelain"])?;
        Ok(stdout.trim().is_empty())
    }

    fn has_unpushed_commits(&self, dir: &Path) -> Result<bool> {
        let stdout = self.run(dir, &["branch", "--no-color", "-vv"])?;
        Ok(any_branch_ahead(&stdout))
    }

    fn add_submodule(&self, root: &Path, url: &str, directory: &Path) -> Result<()> {
        let dir = directory.to_str().ok_or_else(|| Error::Path {
            message: format!("non-UTF-8 submodule path {}", directory.display()),
        })?;
        self.run(root, &["submodule", "add", url, dir])?;
        Ok(())
    }

    fn checkout(&self, dir: &Path, commit: &str) -> Result<()> {
        self.run(dir, &["checkout", "--detach", commit])?;
        Ok(())
    }

    fn deregister(&self, root: &Path, directory: &Path) -> Result<()> {
        let dir = directory.to_str().ok_or_else(|| Error::Path {
            message: format!("non-UTF-8 submodule path {}", directory.display()),
        })?;
        let section = format!("submodule.{dir}");

        // The config sections may already be gone (partially removed
        // submodule); tolerate that, but the index entry must be droppable.
        self.run_soft(
            root,
            &["config", "-f", ".gitmodules", "--remove-section", &section],
        )?;
        self.run_soft(root, &["config", "--remove-section", &section])?;
        self.run(root, &["rm", "--cached", dir])?;
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Parse `git submodule status` output.
///
/// Lines look like ` <hash> <path> (<describe>)`, with a one-character state
/// prefix (`+`, `-`, `U`, or space) glued to the hash.
pub fn parse_submodule_status(stdout: &str) -> Vec<SubmoduleStatus> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut tokens = line.trim().split_whitespace();
            let head: String = tokens
                .next()?
                .chars()
                .filter(char::is_ascii_hexdigit)
                .collect();
            let directory = tokens.next()?;
            if head.is_empty() {
                return None;
            }
            Some(SubmoduleStatus {
                head,
                directory: PathBuf::from(directory),
            })
        })
        .collect()
}

/// Extract the URL from the first line of `git remote -v` output.
pub fn parse_remote_url(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| !l.trim().is_empty())?;
    line.split_whitespace().nth(1).map(str::to_string)
}

/// Classify `git show-ref <name>` output into a [`RefKind`].
pub fn classify_show_ref(stdout: &str) -> RefKind {
    let mut kind = RefKind::Detached;
    for line in stdout.lines() {
        let Some(full_ref) = line.split_whitespace().nth(1) else {
            continue;
        };
        if full_ref.starts_with("refs/heads/") || full_ref.starts_with("refs/remotes/") {
            return RefKind::Branch;
        }
        if full_ref.starts_with("refs/tags/") {
            kind = RefKind::Tag;
        }
    }
    kind
}

/// Whether any line of `git branch -vv` output reports a tracking branch
/// ahead of its remote.
pub fn any_branch_ahead(stdout: &str) -> bool {
    stdout.lines().any(|line| {
        let Some(open) = line.find('[') else {
            return false;
        };
        let Some(close) = line[open..].find(']') else {
            return false;
        };
        line[open..open + close].contains("ahead ")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submodule_status() {
        let stdout = "\
 4f5e6d7c8b9a0f1e2d3c4b5a69788796a5b4c3d2 externals/foo (v1.0.0)
+1111111111111111111111111111111111111111 externals/bar (heads/main)
-2222222222222222222222222222222222222222 externals/baz
";
        let entries = parse_submodule_status(stdout);
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].head,
            "4f5e6d7c8b9a0f1e2d3c4b5a69788796a5b4c3d2"
        );
        assert_eq!(entries[0].directory, PathBuf::from("externals/foo"));
        // State prefix characters are stripped from the hash
        assert_eq!(
            entries[1].head,
            "1111111111111111111111111111111111111111"
        );
        assert_eq!(entries[2].directory, PathBuf::from("externals/baz"));
    }

    #[test]
    fn test_parse_submodule_status_empty() {
        assert!(parse_submodule_status("").is_empty());
        assert!(parse_submodule_status("\n  \n").is_empty());
    }

    #[test]
    fn test_parse_remote_url() {
        let stdout = "\
origin\tgit@example.com:vendor/foo.git (fetch)
origin\tgit@example.com:vendor/foo.git (push)
";
        assert_eq!(
            parse_remote_url(stdout).as_deref(),
            Some("git@example.com:vendor/foo.git")
        );
        assert_eq!(parse_remote_url(""), None);
    }

    #[test]
    fn test_classify_show_ref_branch() {
        let local = "1234 refs/heads/main\n";
        assert_eq!(classify_show_ref(local), RefKind::Branch);

        let remote = "1234 refs/remotes/origin/main\n";
        assert_eq!(classify_show_ref(remote), RefKind::Branch);

        // A name that is both a tag and a branch counts as a branch
        let both = "1234 refs/tags/main\n5678 refs/heads/main\n";
        assert_eq!(classify_show_ref(both), RefKind::Branch);
    }

    #[test]
    fn test_classify_show_ref_tag() {
        let stdout = "1234 refs/tags/v1.0.0\n";
        assert_eq!(classify_show_ref(stdout), RefKind::Tag);
    }

    #[test]
    fn test_classify_show_ref_detached() {
        assert_eq!(classify_show_ref(""), RefKind::Detached);
        assert_eq!(classify_show_ref("garbage"), RefKind::Detached);
    }

    #[test]
    fn test_any_branch_ahead() {
        let ahead = "* main 1a2b3c4 [origin/main: ahead 2] tweak parser\n";
        assert!(any_branch_ahead(ahead));

        let ahead_behind = "  dev 9f8e7d6 [origin/dev: ahead 1, behind 3] wip\n";
        assert!(any_branch_ahead(ahead_behind));

        let up_to_date = "* main 1a2b3c4 [origin/main] tweak parser\n";
        assert!(!any_branch_ahead(up_to_date));

        let behind_only = "* main 1a2b3c4 [origin/main: behind 5] tweak parser\n";
        assert!(!any_branch_ahead(behind_only));

        let no_upstream = "* main 1a2b3c4 tweak parser\n";
        assert!(!any_branch_ahead(no_upstream));

        assert!(!any_branch_ahead(""));
    }

    #[test]
    fn test_any_branch_ahead_bracket_in_message() {
        // Commit message containing brackets must not trip the check
        let line = "* main 1a2b3c4 [origin/main] fix [ahead of schedule]\n";
        assert!(!any_branch_ahead(line));
    }
}
