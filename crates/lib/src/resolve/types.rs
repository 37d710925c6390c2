//! The run-set: the resolver's final artifact.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::tree::{Module, ModulePath, ModuleTree};

/// The computed run decision per module.
///
/// Recomputed on every invocation; nothing here is persisted. The default
/// value is the no-op run-set under which every decision is false — note
/// that this skips `always_run` too, matching the short-circuit for an
/// empty change list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSet {
  /// Every module is affected, regardless of ownership and closure.
  pub affects_all: bool,

  /// Directly changed modules plus (mode permitting) their dependents.
  pub affected: BTreeSet<ModulePath>,

  /// Modules forced to run by configuration.
  pub always_run: BTreeSet<ModulePath>,

  /// Modules forced to never run; beats every other signal.
  pub never_run: BTreeSet<ModulePath>,
}

impl RunSet {
  /// The final decision for one module. `never_run` is checked first and
  /// unconditionally wins.
  pub fn should_run(&self, module: &ModulePath) -> bool {
    !self.never_run.contains(module)
      && (self.affects_all || self.affected.contains(module) || self.always_run.contains(module))
  }

  /// The modules of `tree` that should run, in tree order.
  pub fn modules_to_run<'a>(&self, tree: &'a ModuleTree) -> Vec<&'a Module> {
    tree
      .modules()
      .iter()
      .filter(|module| self.should_run(&module.path))
      .collect()
  }
}
