//! Module tree index and path ownership resolution.
//!
//! The tree is built once per invocation, after the manifest is loaded, and
//! is read-only afterwards. Module directories are canonicalized at build
//! time so that ownership queries are a pure longest-prefix match.

pub mod types;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;

use crate::manifest::Manifest;
use crate::util::paths::resolve_file;

pub use types::{InvalidModulePath, Module, ModulePath};

/// Errors while building the module tree from the manifest.
#[derive(Debug, Error)]
pub enum TreeError {
  #[error(transparent)]
  InvalidModulePath(#[from] InvalidModulePath),

  #[error("duplicate module path '{0}'")]
  DuplicatePath(ModulePath),

  #[error("modules '{first}' and '{second}' resolve to the same directory {}", dir.display())]
  DuplicateDir {
    first: ModulePath,
    second: ModulePath,
    dir: PathBuf,
  },

  #[error("module '{path}' directory {} is not accessible", dir.display())]
  ModuleDir {
    path: ModulePath,
    dir: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("module path '{0}' must not be declared: the root module is implicit")]
  RootDeclared(ModulePath),
}

/// Read-only index of all modules, keyed by path and by directory.
#[derive(Debug)]
pub struct ModuleTree {
  root_dir: PathBuf,
  modules: Vec<Module>,
  by_path: HashMap<ModulePath, usize>,
}

impl ModuleTree {
  /// Build the tree from the manifest's module declarations.
  ///
  /// `root_dir` is the tree root (the manifest's directory); it becomes the
  /// directory of the implicit root module `:`. Every declared directory is
  /// canonicalized and must exist. Dependency entries that are not module
  /// paths are external artifacts and are dropped here.
  pub fn from_manifest(root_dir: &Path, manifest: &Manifest) -> Result<Self, TreeError> {
    let root_path = ModulePath::root();
    let root_dir = dunce::canonicalize(root_dir).map_err(|source| TreeError::ModuleDir {
      path: root_path.clone(),
      dir: root_dir.to_path_buf(),
      source,
    })?;

    let mut modules = vec![Module {
      path: root_path.clone(),
      dir: root_dir.clone(),
      deps: Vec::new(),
    }];
    let mut by_path = HashMap::from([(root_path.clone(), 0)]);
    let mut by_dir = HashMap::from([(root_dir.clone(), root_path)]);

    for decl in &manifest.modules {
      let path = ModulePath::parse(&decl.path)?;
      if path.is_root() {
        return Err(TreeError::RootDeclared(path));
      }

      let dir = root_dir.join(&decl.dir);
      let dir = dunce::canonicalize(&dir).map_err(|source| TreeError::ModuleDir {
        path: path.clone(),
        dir,
        source,
      })?;

      if by_path.contains_key(&path) {
        return Err(TreeError::DuplicatePath(path));
      }
      if let Some(first) = by_dir.get(&dir) {
        return Err(TreeError::DuplicateDir {
          first: first.clone(),
          second: path,
          dir,
        });
      }

      let deps = decl
        .deps
        .iter()
        .filter_map(|dep| match ModulePath::parse(dep) {
          Ok(dep) => Some(dep),
          Err(_) => {
            trace!(module = %path, dep = %dep, "skipping non-module dependency");
            None
          }
        })
        .collect();

      by_path.insert(path.clone(), modules.len());
      by_dir.insert(dir.clone(), path.clone());
      modules.push(Module { path, dir, deps });
    }

    Ok(Self {
      root_dir,
      modules,
      by_path,
    })
  }

  /// The canonical tree root directory.
  pub fn root_dir(&self) -> &Path {
    &self.root_dir
  }

  /// The implicit root module.
  pub fn root(&self) -> &Module {
    &self.modules[0]
  }

  /// All modules, root first, then declaration order.
  pub fn modules(&self) -> &[Module] {
    &self.modules
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  pub fn get(&self, path: &ModulePath) -> Option<&Module> {
    self.by_path.get(path).map(|&i| &self.modules[i])
  }

  pub fn contains(&self, path: &ModulePath) -> bool {
    self.by_path.contains_key(path)
  }

  /// Resolve the module owning `file`.
  ///
  /// A module is a candidate owner when its canonical directory is a
  /// path-segment prefix of the file's resolved path; the owner is the
  /// candidate with the longest directory. Files under the tree root always
  /// have the root module as a candidate, so they resolve to the root when
  /// nothing more specific matches. Files outside the tree resolve to `None`.
  ///
  /// Ties on directory length cannot occur between distinct directories that
  /// contain the same file, but should the index ever be misconfigured the
  /// lexicographically smallest module path wins.
  pub fn owner_of(&self, file: &Path) -> Option<&Module> {
    let file = resolve_file(&self.root_dir, file);

    let mut owner: Option<&Module> = None;
    for module in &self.modules {
      if !file.starts_with(&module.dir) {
        continue;
      }
      owner = match owner {
        None => Some(module),
        Some(best) => {
          let best_len = best.dir.as_os_str().len();
          let len = module.dir.as_os_str().len();
          if len > best_len || (len == best_len && module.path < best.path) {
            Some(module)
          } else {
            Some(best)
          }
        }
      };
    }
    owner
  }
}
