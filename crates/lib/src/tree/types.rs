//! Module identity types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MODULE_SEPARATOR;

/// A hierarchical module identifier, e.g. `:core` or `:app:feature`.
///
/// The root module is the bare separator `:`. Every other path starts with
/// the separator and contains no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(pub String);

/// A module path string that does not follow the `:seg:seg` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid module path '{0}': must start with ':' and contain no empty segments")]
pub struct InvalidModulePath(pub String);

impl ModulePath {
  /// The implicit root module, `:`.
  pub fn root() -> Self {
    Self(MODULE_SEPARATOR.to_string())
  }

  /// Parse and validate a module path string.
  pub fn parse(s: &str) -> Result<Self, InvalidModulePath> {
    let Some(rest) = s.strip_prefix(MODULE_SEPARATOR) else {
      return Err(InvalidModulePath(s.to_string()));
    };
    if !rest.is_empty() && rest.split(MODULE_SEPARATOR).any(str::is_empty) {
      return Err(InvalidModulePath(s.to_string()));
    }
    Ok(Self(s.to_string()))
  }

  pub fn is_root(&self) -> bool {
    self.0.len() == 1
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The task path used to invoke `task` on this module: `:check` for the
  /// root module, `:app:check` for `:app`.
  pub fn task_path(&self, task: &str) -> String {
    if self.is_root() {
      format!("{}{}", MODULE_SEPARATOR, task)
    } else {
      format!("{}{}{}", self.0, MODULE_SEPARATOR, task)
    }
  }
}

impl std::fmt::Display for ModulePath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A module of the build tree.
#[derive(Debug, Clone)]
pub struct Module {
  /// Unique hierarchical identifier.
  pub path: ModulePath,

  /// Canonical absolute directory owning the module's files.
  pub dir: PathBuf,

  /// Declared direct module dependencies. May reference modules that are not
  /// part of the tree; those references never become graph edges.
  pub deps: Vec<ModulePath>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_accepts_root() {
    let root = ModulePath::parse(":").unwrap();
    assert!(root.is_root());
    assert_eq!(root, ModulePath::root());
  }

  #[test]
  fn parse_accepts_nested_paths() {
    let path = ModulePath::parse(":app:feature").unwrap();
    assert!(!path.is_root());
    assert_eq!(path.as_str(), ":app:feature");
  }

  #[test]
  fn parse_rejects_missing_separator() {
    assert!(ModulePath::parse("app").is_err());
    assert!(ModulePath::parse("").is_err());
  }

  #[test]
  fn parse_rejects_empty_segments() {
    assert!(ModulePath::parse("::app").is_err());
    assert!(ModulePath::parse(":app:").is_err());
    assert!(ModulePath::parse(":app::feature").is_err());
  }

  #[test]
  fn task_path_for_root_and_children() {
    assert_eq!(ModulePath::root().task_path("check"), ":check");
    assert_eq!(ModulePath::parse(":app").unwrap().task_path("check"), ":app:check");
  }
}
