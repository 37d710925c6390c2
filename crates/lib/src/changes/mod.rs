//! The change source: which files changed, and do they affect everything.
//!
//! Two providers feed the same filtering pipeline: a git diff for the
//! selected compare mode, or an explicit list of paths supplied by the
//! caller. Either way the ignore patterns are applied first, the affects-all
//! patterns are matched against the surviving paths, and the survivors are
//! absolutized against the tree root.

pub mod filter;
pub mod git;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use filter::ChangeFilter;
pub use git::{DiffMode, ParseDiffModeError};
pub use types::ChangeError;

/// The filtered change list plus the affects-all signal.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
  /// Absolute paths of the changed files that survived filtering.
  pub files: Vec<PathBuf>,

  /// Whether any surviving path matched an affects-all pattern.
  pub affects_all: bool,
}

impl ChangeSet {
  /// Obtain the change set from `git diff` for the given compare mode.
  ///
  /// The repository is discovered upwards from `start`; returned paths are
  /// relative to its work-tree root and are absolutized against it.
  pub fn from_git(
    start: &Path,
    mode: DiffMode,
    to: Option<&str>,
    from: Option<&str>,
    filter: &ChangeFilter,
  ) -> Result<Self, ChangeError> {
    let repo_root = git::discover_root(start)?;
    let args = git::diff_args(mode, to, from)?;
    let lines = git::run_diff(&repo_root, &args)?;
    Ok(Self::from_lines(&repo_root, &lines, filter))
  }

  /// Build the change set from an explicit list of paths, relative to
  /// `root`. The alternative provider for callers that already know what
  /// changed; the same empty-input anomaly applies.
  pub fn from_paths(
    root: &Path,
    paths: Vec<String>,
    filter: &ChangeFilter,
  ) -> Result<Self, ChangeError> {
    if paths.is_empty() {
      return Err(ChangeError::Empty);
    }
    Ok(Self::from_lines(root, &paths, filter))
  }

  /// Filter the raw path strings and absolutize the survivors.
  fn from_lines(root: &Path, lines: &[String], filter: &ChangeFilter) -> Self {
    let kept: Vec<&String> = lines.iter().filter(|line| !filter.is_ignored(line)).collect();
    let affects_all = kept.iter().any(|line| filter.affects_all(line));
    let files: Vec<PathBuf> = kept.iter().map(|line| root.join(line)).collect();

    debug!(
      total = lines.len(),
      kept = files.len(),
      affects_all,
      "filtered changed files"
    );
    Self { files, affects_all }
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}
