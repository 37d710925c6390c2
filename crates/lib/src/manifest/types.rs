//! Manifest schema and configuration errors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::types::InvalidModulePath;

/// Which modules the task runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
  /// Only modules that directly own a changed file.
  OnlyDirectly,

  /// Directly changed modules plus everything transitively depending on them.
  #[default]
  IncludeDependents,
}

impl Mode {
  pub fn as_str(self) -> &'static str {
    match self {
      Mode::OnlyDirectly => "only-directly",
      Mode::IncludeDependents => "include-dependents",
    }
  }
}

impl std::fmt::Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}': expected 'only-directly' or 'include-dependents'")]
pub struct ParseModeError(pub String);

impl std::str::FromStr for Mode {
  type Err = ParseModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "only-directly" => Ok(Mode::OnlyDirectly),
      "include-dependents" => Ok(Mode::IncludeDependents),
      other => Err(ParseModeError(other.to_string())),
    }
  }
}

/// Resolver settings, declared at the top level of `affected.toml`.
///
/// CLI flags may override `task` and `mode` before validation, the same way
/// the settings file itself is just one source of the effective values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
  /// Task to run on affected modules. Required by [`Settings::validate`].
  #[serde(default)]
  pub task: Option<String>,

  #[serde(default)]
  pub mode: Mode,

  /// Module paths that run whenever anything at all changed.
  #[serde(default)]
  pub always_run: BTreeSet<String>,

  /// Module paths that never run, overriding every other signal.
  #[serde(default)]
  pub never_run: BTreeSet<String>,

  /// Full-match patterns for changed paths to drop before resolution.
  #[serde(default)]
  pub ignore: Vec<String>,

  /// Full-match patterns for changed paths that affect every module.
  #[serde(default)]
  pub affects_all: Vec<String>,

  /// Command used by `affected run`, split on whitespace. Defaults to the
  /// build wrapper in the tree root (`./gradlew`, `gradlew.bat` on Windows).
  #[serde(default)]
  pub runner: Option<String>,

  /// Raise the default log level to debug, like `--verbose`.
  #[serde(default)]
  pub debug: bool,
}

/// One `[[module]]` table of the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleDecl {
  /// Hierarchical module path, e.g. `:app:feature`.
  pub path: String,

  /// Module directory, relative to the manifest's directory.
  pub dir: String,

  /// Direct dependencies, as module paths. Entries that are not module paths
  /// (external artifacts) are ignored when building the graph.
  #[serde(default)]
  pub deps: Vec<String>,
}

/// The parsed `affected.toml`: settings plus the module declarations.
///
/// The root module is implicit; its directory is the manifest's directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
  #[serde(flatten)]
  pub settings: Settings,

  #[serde(default, rename = "module")]
  pub modules: Vec<ModuleDecl>,
}

/// Fatal configuration errors, raised before any resolution begins.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("task is required: set `task` in the manifest or pass --task")]
  MissingTask,

  #[error("task '{0}' must not start with ':'")]
  TaskStartsWithSeparator(String),

  #[error("{field}: {source}")]
  InvalidOverridePath {
    field: &'static str,
    #[source]
    source: InvalidModulePath,
  },

  #[error("invalid {field} pattern '{pattern}': {message}")]
  InvalidPattern {
    field: &'static str,
    pattern: String,
    message: String,
  },
}
