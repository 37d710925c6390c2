//! affected-lib: Core types and logic for `affected`
//!
//! This crate resolves which modules of a multi-module build tree are
//! affected by a set of changed files:
//! - `tree`: indexes modules by directory and answers "which module owns this path"
//! - `graph`: reverse dependency graph and transitive dependent closure
//! - `changes`: obtains and filters the changed-file list (git diff or explicit list)
//! - `resolve`: merges direct impact, dependents, and override sets into a run-set
//! - `manifest`: the `affected.toml` module/configuration source

pub mod changes;
pub mod consts;
pub mod graph;
pub mod manifest;
pub mod resolve;
pub mod tree;
pub mod util;
