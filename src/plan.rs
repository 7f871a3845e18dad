//! # Reconciliation Planner and Change Classifier
//!
//! The planner three-way diffs the manifest against the scanned actual state.
//! Directory identity (the absolute path of a dependency's target directory)
//! is the sole join key: a manifest entry and an actual entry naming the same
//! directory are the same logical dependency, whatever they are called.
//!
//! Matched pairs become update candidates, manifest entries with no match
//! become creates, and actual entries with no manifest counterpart become
//! removes. The three sets partition the union of manifest and actual
//! directories. After the resolver has turned each candidate's requested
//! commit-ish into a concrete hash, the classifier splits candidates into
//! `stay` (hash equals the current head) and `update`.

use std::path::PathBuf;

use console::style;

use crate::manifest::{ManifestEntry, SymlinkSpec};
use crate::scan::ActualEntry;
use crate::workspace::Workspace;

/// One dependency threaded through the reconciliation pipeline.
///
/// Created by the planner, filled in by the resolver, consumed read-only by
/// the executor and the symlink synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Dependency name (directory basename for entries without a manifest
    /// counterpart).
    pub name: String,
    /// Clone URL.
    pub url: String,
    /// Absolute path of the dependency's directory.
    pub directory: PathBuf,
    /// Commit currently checked out, if the dependency exists on disk.
    pub previous_head: Option<String>,
    /// Requested commit-ish from the manifest.
    pub requested: String,
    /// Concrete commit hash, once the resolver has run.
    pub resolved: Option<String>,
    /// Declared symlinks into the dependency's tree.
    pub symlinks: Vec<SymlinkSpec>,
}

/// An update candidate whose commit-ish could not be resolved even after
/// fetching. Excluded from the plan, reported as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub name: String,
    pub requested: String,
    pub directory: PathBuf,
}

/// Output of the planner, before resolution and classification.
#[derive(Debug, Default)]
pub struct RawPlan {
    /// Entries present in both the manifest and the working tree.
    pub candidates: Vec<PlanEntry>,
    /// Manifest entries with no directory on disk.
    pub create: Vec<PlanEntry>,
    /// On-disk entries absent from the manifest.
    pub remove: Vec<PlanEntry>,
}

/// The fully classified plan, ready for execution.
#[derive(Debug, Default)]
pub struct Plan {
    pub stay: Vec<PlanEntry>,
    pub update: Vec<PlanEntry>,
    pub create: Vec<PlanEntry>,
    pub remove: Vec<PlanEntry>,
    /// Candidates dropped by the resolver, surfaced for the report.
    pub unresolved: Vec<Unresolved>,
}

/// Three-way diff of manifest entries against actual state.
///
/// Manifest entries are assumed unique by directory; `manifest::load`
/// rejects duplicates before they reach this point.
pub fn diff(manifest: &[ManifestEntry], actual: Vec<ActualEntry>, workspace: &Workspace) -> RawPlan {
    let mut plan = RawPlan::default();

    for entry in manifest {
        let ideal = workspace.dependency_dir(&entry.name);
        match actual.iter().find(|a| a.directory == ideal) {
            Some(existing) => plan.candidates.push(PlanEntry {
                name: entry.name.clone(),
                url: existing.remote_url.clone(),
                directory: ideal,
                previous_head: Some(existing.head.clone()),
                requested: entry.commit.clone(),
                resolved: None,
                symlinks: entry.symlinks.clone(),
            }),
            None => plan.create.push(PlanEntry {
                name: entry.name.clone(),
                url: entry.url.clone(),
                directory: ideal,
                previous_head: None,
                requested: entry.commit.clone(),
                resolved: None,
                symlinks: entry.symlinks.clone(),
            }),
        }
    }

    for existing in actual {
        let matched = manifest
            .iter()
            .any(|m| workspace.dependency_dir(&m.name) == existing.directory);
        if !matched {
            let name = existing
                .directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            plan.remove.push(PlanEntry {
                name,
                url: existing.remote_url,
                requested: existing.head.clone(),
                previous_head: Some(existing.head),
                directory: existing.directory,
                resolved: None,
                symlinks: Vec::new(),
            });
        }
    }

    plan
}

/// Split resolved candidates into `stay` and `update`.
///
/// Pure: an entry stays exactly when its resolved commit equals its previous
/// head, regardless of whether the requested name was a branch, tag, or hash.
pub fn classify(candidates: Vec<PlanEntry>) -> (Vec<PlanEntry>, Vec<PlanEntry>) {
    candidates
        .into_iter()
        .partition(|entry| entry.resolved == entry.previous_head)
}

/// Abbreviate a commit hash for display.
fn short(hash: &str) -> &str {
    &hash[..hash.len().min(7)]
}

impl Plan {
    /// Entries that will exist on disk after execution.
    pub fn surviving(&self) -> impl Iterator<Item = &PlanEntry> {
        self.stay.iter().chain(&self.update).chain(&self.create)
    }

    /// Whether executing the plan would change anything.
    pub fn is_noop(&self) -> bool {
        self.update.is_empty() && self.create.is_empty() && self.remove.is_empty()
    }

    /// Human-readable report, in application order (remove, create, update),
    /// with unchanged and skipped entries listed last.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for entry in &self.remove {
            out.push_str(&format!(
                "  {}  {}\n",
                style("remove").red(),
                entry.directory.display()
            ));
        }
        for entry in &self.create {
            out.push_str(&format!(
                "  {}  {} <- {}\n",
                style("create").cyan(),
                entry.name,
                entry.url
            ));
        }
        for entry in &self.update {
            let prev = entry.previous_head.as_deref().unwrap_or("?");
            let next = entry.resolved.as_deref().unwrap_or("?");
            out.push_str(&format!(
                "  {}  {} @ {} ({} -> {})\n",
                style("update").yellow(),
                entry.name,
                entry.requested,
                short(prev),
                short(next)
            ));
        }
        for entry in &self.stay {
            let head = entry.resolved.as_deref().unwrap_or("?");
            out.push_str(&format!(
                "  {}    {} @ {} ({})\n",
                style("stay").green(),
                entry.name,
                entry.requested,
                short(head)
            ));
        }
        for entry in &self.unresolved {
            out.push_str(&format!(
                "  {}    {} @ {} (not found after fetch)\n",
                style("skip").magenta(),
                entry.name,
                entry.requested
            ));
        }

        if out.is_empty() {
            out.push_str("  nothing to do\n");
        }
        out
    }
}
