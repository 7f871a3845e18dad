//! # gitdeps Library
//!
//! Core functionality for synchronizing a repository's vendored external
//! dependencies (git submodules under `externals/`) against the declarative
//! `.gitdeps` manifest. The `gitdeps` command-line tool is a thin wrapper
//! around this library.
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: the desired dependency set, one fixed
//!   commit-ish per entry, plus declared symlinks.
//! - **Repository Backend (`git`)**: the [`git::GitBackend`] trait and the
//!   system-git implementation every stage talks to.
//! - **Scanner (`scan`)**: the dependency set actually materialized in the
//!   working tree, with orphaned registrations cleaned up eagerly.
//! - **Planner and Classifier (`plan`)**: the three-way diff by directory
//!   identity, and the stay/update split once commits are resolved.
//! - **Resolver (`resolve`)**: commit-ish to hash, with branch-fetch and
//!   fetch-retry semantics.
//! - **Executor (`execute`)**: applies remove, create, update in that fixed
//!   order, with safety-gated removal.
//! - **Symlink Synchronizer (`links`)**: repoints declared links and prunes
//!   dangling ones tree-wide.
//!
//! ## Execution Flow
//!
//! ```text
//! manifest + scan -> plan::diff -> resolve::resolve_candidates
//!     -> plan::classify -> execute::apply -> links::sync_links
//!     -> links::prune_dangling
//! ```
//!
//! Each stage consumes the previous stage's output in full before the next
//! begins; the run is a strict pipeline over a single working tree.

pub mod error;
pub mod execute;
pub mod git;
pub mod links;
pub mod manifest;
pub mod output;
pub mod plan;
pub mod resolve;
pub mod scan;
pub mod workspace;

#[cfg(test)]
mod plan_proptest;
