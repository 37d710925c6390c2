//! Errors for the change source.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use super::git::DiffMode;

/// Errors while obtaining the changed-file list.
///
/// All of these are fatal: the resolver never runs on a partial or guessed
/// change list.
#[derive(Debug, Error)]
pub enum ChangeError {
  /// The selected compare mode needs a base revision.
  #[error("[{mode}] a base revision is required: pass --from")]
  MissingFrom { mode: DiffMode },

  /// `--from` on its own is ambiguous in commit mode.
  #[error("[{mode}] --to must also be specified when --from is given")]
  MissingTo { mode: DiffMode },

  #[error("no git repository found at or above {}", path.display())]
  Discover {
    path: PathBuf,
    #[source]
    source: Box<gix::discover::Error>,
  },

  #[error("git repository at {} has no work tree", path.display())]
  BareRepository { path: PathBuf },

  #[error("failed to invoke git")]
  Spawn(#[from] std::io::Error),

  #[error("git diff exited with {status}: {stderr}")]
  DiffFailed { status: ExitStatus, stderr: String },

  #[error("git diff wrote to stderr: {0}")]
  DiffStderr(String),

  /// An empty change list is an anomaly, not "no changes": every compare
  /// mode diffs against something that is known to differ.
  #[error("the change source returned no paths")]
  Empty,
}
