//! Git diff invocation.
//!
//! Builds the `git diff --name-only` argument list for the selected compare
//! mode and runs it at the repository work-tree root. Command construction
//! is a pure function so the per-mode revision rules stay testable without a
//! repository.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::consts::HEAD;

use super::types::ChangeError;

/// How the two revisions handed to `git diff` are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffMode {
  /// Diff a single commit against its parent. Defaults to `HEAD`.
  #[default]
  Commit,

  /// Diff two refs directly.
  Branch,

  /// Diff using the two-dot range syntax `from..to`.
  BranchTwoDotted,

  /// Diff using the three-dot range syntax `from...to` (merge-base).
  BranchThreeDotted,
}

impl DiffMode {
  pub fn as_str(self) -> &'static str {
    match self {
      DiffMode::Commit => "commit",
      DiffMode::Branch => "branch",
      DiffMode::BranchTwoDotted => "branch-two-dotted",
      DiffMode::BranchThreeDotted => "branch-three-dotted",
    }
  }
}

impl std::fmt::Display for DiffMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
  "unknown compare mode '{0}': expected one of commit, branch, branch-two-dotted, branch-three-dotted"
)]
pub struct ParseDiffModeError(pub String);

impl std::str::FromStr for DiffMode {
  type Err = ParseDiffModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "commit" => Ok(DiffMode::Commit),
      "branch" => Ok(DiffMode::Branch),
      "branch-two-dotted" => Ok(DiffMode::BranchTwoDotted),
      "branch-three-dotted" => Ok(DiffMode::BranchThreeDotted),
      other => Err(ParseDiffModeError(other.to_string())),
    }
  }
}

/// Build the full `git` argument list for the mode and revision selection.
///
/// `to` is the newer revision, `from` the base. The revision rules per mode:
/// - `commit`: both -> `from~ to`; only `to` -> `to~ to` (that commit's own
///   changes); neither -> `HEAD~ HEAD`; only `from` is an error.
/// - `branch`: both -> `from to`; only `from` -> `from HEAD`; `from` is
///   required.
/// - `branch-two-dotted` / `branch-three-dotted`: both -> `from..to` /
///   `from...to`; only `from` -> open-ended range; `from` is required.
pub fn diff_args(
  mode: DiffMode,
  to: Option<&str>,
  from: Option<&str>,
) -> Result<Vec<String>, ChangeError> {
  let mut args = vec!["diff".to_string(), "--name-only".to_string()];

  match mode {
    DiffMode::Commit => match (to, from) {
      (Some(to), Some(from)) => {
        args.push(format!("{from}~"));
        args.push(to.to_string());
      }
      (Some(to), None) => {
        args.push(format!("{to}~"));
        args.push(to.to_string());
      }
      (None, Some(_)) => return Err(ChangeError::MissingTo { mode }),
      (None, None) => {
        args.push(format!("{HEAD}~"));
        args.push(HEAD.to_string());
      }
    },
    DiffMode::Branch => match (to, from) {
      (Some(to), Some(from)) => {
        args.push(from.to_string());
        args.push(to.to_string());
      }
      (None, Some(from)) => {
        args.push(from.to_string());
        args.push(HEAD.to_string());
      }
      (_, None) => return Err(ChangeError::MissingFrom { mode }),
    },
    DiffMode::BranchTwoDotted => match (to, from) {
      (Some(to), Some(from)) => args.push(format!("{from}..{to}")),
      (None, Some(from)) => args.push(format!("{from}..")),
      (_, None) => return Err(ChangeError::MissingFrom { mode }),
    },
    DiffMode::BranchThreeDotted => match (to, from) {
      (Some(to), Some(from)) => args.push(format!("{from}...{to}")),
      (None, Some(from)) => args.push(format!("{from}...")),
      (_, None) => return Err(ChangeError::MissingFrom { mode }),
    },
  }

  Ok(args)
}

/// Find the work-tree root of the repository containing `start`.
pub fn discover_root(start: &Path) -> Result<PathBuf, ChangeError> {
  let repo = gix::discover(start).map_err(|source| ChangeError::Discover {
    path: start.to_path_buf(),
    source: Box::new(source),
  })?;

  let workdir = repo.workdir().ok_or_else(|| ChangeError::BareRepository {
    path: start.to_path_buf(),
  })?;
  Ok(workdir.to_path_buf())
}

/// Run `git` with the given arguments at the repository root and return the
/// non-empty stdout lines.
///
/// Any stderr output or a non-zero exit fails the invocation; an empty diff
/// is an anomaly and fails too.
pub fn run_diff(repo_root: &Path, args: &[String]) -> Result<Vec<String>, ChangeError> {
  debug!(root = %repo_root.display(), ?args, "running git");

  let output = Command::new("git").args(args).current_dir(repo_root).output()?;

  let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
  if !output.status.success() {
    return Err(ChangeError::DiffFailed {
      status: output.status,
      stderr,
    });
  }
  if !stderr.is_empty() {
    return Err(ChangeError::DiffStderr(stderr));
  }

  let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(String::from)
    .collect();

  if lines.is_empty() {
    return Err(ChangeError::Empty);
  }
  Ok(lines)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(parts: &[&str]) -> Vec<String> {
    let mut all = vec!["diff".to_string(), "--name-only".to_string()];
    all.extend(parts.iter().map(|p| p.to_string()));
    all
  }

  #[test]
  fn commit_mode_defaults_to_head() {
    assert_eq!(
      diff_args(DiffMode::Commit, None, None).unwrap(),
      args(&["HEAD~", "HEAD"])
    );
  }

  #[test]
  fn commit_mode_diffs_a_single_commit_against_its_parent() {
    assert_eq!(
      diff_args(DiffMode::Commit, Some("abc123"), None).unwrap(),
      args(&["abc123~", "abc123"])
    );
  }

  #[test]
  fn commit_mode_with_both_revisions() {
    assert_eq!(
      diff_args(DiffMode::Commit, Some("new"), Some("old")).unwrap(),
      args(&["old~", "new"])
    );
  }

  #[test]
  fn commit_mode_rejects_lone_from() {
    let err = diff_args(DiffMode::Commit, None, Some("old")).unwrap_err();
    assert!(matches!(err, ChangeError::MissingTo { mode: DiffMode::Commit }));
  }

  #[test]
  fn branch_mode_with_both_revisions() {
    assert_eq!(
      diff_args(DiffMode::Branch, Some("feature"), Some("main")).unwrap(),
      args(&["main", "feature"])
    );
  }

  #[test]
  fn branch_mode_defaults_to_head_for_to() {
    assert_eq!(
      diff_args(DiffMode::Branch, None, Some("main")).unwrap(),
      args(&["main", "HEAD"])
    );
  }

  #[test]
  fn branch_mode_requires_from() {
    let err = diff_args(DiffMode::Branch, Some("feature"), None).unwrap_err();
    assert!(matches!(err, ChangeError::MissingFrom { mode: DiffMode::Branch }));
  }

  #[test]
  fn two_dotted_ranges() {
    assert_eq!(
      diff_args(DiffMode::BranchTwoDotted, Some("feature"), Some("main")).unwrap(),
      args(&["main..feature"])
    );
    assert_eq!(
      diff_args(DiffMode::BranchTwoDotted, None, Some("main")).unwrap(),
      args(&["main.."])
    );
    assert!(diff_args(DiffMode::BranchTwoDotted, None, None).is_err());
  }

  #[test]
  fn three_dotted_ranges() {
    assert_eq!(
      diff_args(DiffMode::BranchThreeDotted, Some("feature"), Some("main")).unwrap(),
      args(&["main...feature"])
    );
    assert_eq!(
      diff_args(DiffMode::BranchThreeDotted, None, Some("main")).unwrap(),
      args(&["main..."])
    );
    assert!(diff_args(DiffMode::BranchThreeDotted, None, None).is_err());
  }

  #[test]
  fn diff_mode_parses_from_option_names() {
    for mode in [
      DiffMode::Commit,
      DiffMode::Branch,
      DiffMode::BranchTwoDotted,
      DiffMode::BranchThreeDotted,
    ] {
      assert_eq!(mode.as_str().parse::<DiffMode>().unwrap(), mode);
    }
    assert!("two-dotted".parse::<DiffMode>().is_err());
  }
}
