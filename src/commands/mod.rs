//! # CLI Command Implementations
//!
//! Each subcommand of the `gitdeps` command-line tool lives in its own file.
//!
//! A command module contains:
//! - An `Args` struct defining the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and orchestrates the
//!   necessary operations by calling into the `gitdeps` library.

pub mod completions;
pub mod sync;
