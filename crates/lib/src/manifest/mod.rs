//! Loading and validation of the `affected.toml` manifest.
//!
//! The manifest is the module configuration source: it enumerates every
//! module of the tree (path, directory, declared dependencies) and carries
//! the resolver settings. It is read once per invocation; everything the
//! resolver consumes afterwards is an immutable snapshot built from it.

pub mod types;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::MODULE_SEPARATOR;
use crate::tree::types::ModulePath;

pub use types::{ConfigError, Manifest, Mode, ModuleDecl, ParseModeError, Settings};

/// Errors while reading or parsing the manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: Box<toml::de::Error>,
  },
}

impl Manifest {
  /// Load and parse a manifest file.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let manifest: Manifest = toml::from_str(&raw).map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source: Box::new(source),
    })?;

    debug!(
      path = %path.display(),
      modules = manifest.modules.len(),
      "loaded manifest"
    );
    Ok(manifest)
  }
}

impl Settings {
  /// Validate the effective settings.
  ///
  /// Runs after CLI overrides have been merged in and before any resolution:
  /// a validation failure aborts the whole invocation.
  pub fn validate(&self) -> Result<(), ConfigError> {
    match self.task.as_deref() {
      None | Some("") => return Err(ConfigError::MissingTask),
      Some(task) if task.starts_with(MODULE_SEPARATOR) => {
        return Err(ConfigError::TaskStartsWithSeparator(task.to_string()));
      }
      Some(_) => {}
    }

    for entry in &self.always_run {
      ModulePath::parse(entry).map_err(|source| ConfigError::InvalidOverridePath {
        field: "always-run",
        source,
      })?;
    }
    for entry in &self.never_run {
      ModulePath::parse(entry).map_err(|source| ConfigError::InvalidOverridePath {
        field: "never-run",
        source,
      })?;
    }

    Ok(())
  }
}
