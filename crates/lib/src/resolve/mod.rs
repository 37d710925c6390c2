//! Run-set policy merging.
//!
//! `resolve` joins the filtered change set, the ownership index, the
//! dependent closure, and the override sets into the final [`RunSet`]. It is
//! a pure function over data built once per invocation; every default it
//! applies is logged so a misconfigured module boundary stays visible.

pub mod types;

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::changes::ChangeSet;
use crate::graph::DependencyGraph;
use crate::manifest::{Mode, Settings};
use crate::tree::{ModulePath, ModuleTree};

pub use types::RunSet;

/// Compute the run-set for the invocation.
pub fn resolve(
  tree: &ModuleTree,
  graph: &DependencyGraph,
  changes: &ChangeSet,
  settings: &Settings,
) -> RunSet {
  // Nothing changed and nothing forces a full run: stop before resolving
  // overrides, so not even always-run modules fire.
  if changes.is_empty() && !changes.affects_all {
    debug!("no changes after filtering; nothing will run");
    return RunSet::default();
  }

  let always_run = match_overrides(tree, &settings.always_run, "always-run");
  let never_run = match_overrides(tree, &settings.never_run, "never-run");
  debug!(?always_run, ?never_run, "resolved override sets");

  // Everything runs anyway; skip per-file ownership and the closure.
  if changes.affects_all {
    debug!("a changed file affects all modules");
    return RunSet {
      affects_all: true,
      affected: BTreeSet::new(),
      always_run,
      never_run,
    };
  }

  let mut affected = BTreeSet::new();
  for file in &changes.files {
    match tree.owner_of(file) {
      Some(owner) => {
        if owner.path.is_root() && tree.len() > 1 {
          debug!(
            file = %file.display(),
            "no module directory matches; attributed to the root module"
          );
        }
        affected.insert(owner.path.clone());
      }
      None => {
        warn!(
          file = %file.display(),
          "changed file is outside the build tree; dropped from the direct set"
        );
      }
    }
  }
  debug!(?affected, "directly affected modules");

  if settings.mode == Mode::IncludeDependents {
    let dependents = graph.dependent_closure(&affected);
    debug!(?dependents, "dependent affected modules");
    affected.extend(dependents);
  }

  RunSet {
    affects_all: false,
    affected,
    always_run,
    never_run,
  }
}

/// Match configured override paths against the known module set. Entries are
/// shape-validated by `Settings::validate`; entries naming no known module
/// are skipped.
fn match_overrides(
  tree: &ModuleTree,
  entries: &BTreeSet<String>,
  field: &'static str,
) -> BTreeSet<ModulePath> {
  entries
    .iter()
    .filter_map(|entry| {
      let path = ModulePath(entry.clone());
      if tree.contains(&path) {
        Some(path)
      } else {
        debug!(field, entry = %entry, "override does not match any module");
        None
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::changes::ChangeFilter;
  use crate::manifest::Manifest;
  use crate::manifest::types::ModuleDecl;

  fn decl(path: &str, dir: &str, deps: &[&str]) -> ModuleDecl {
    ModuleDecl {
      path: path.to_string(),
      dir: dir.to_string(),
      deps: deps.iter().map(|d| d.to_string()).collect(),
    }
  }

  /// A three-module chain: `:app` depends on `:lib` depends on `:core`.
  fn chain() -> (tempfile::TempDir, ModuleTree, DependencyGraph) {
    let temp = tempfile::tempdir().unwrap();
    for dir in ["core", "lib", "app"] {
      std::fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    let manifest = Manifest {
      modules: vec![
        decl(":core", "core", &[]),
        decl(":lib", "lib", &[":core"]),
        decl(":app", "app", &[":lib"]),
      ],
      ..Manifest::default()
    };
    let tree = ModuleTree::from_manifest(temp.path(), &manifest).unwrap();
    let graph = DependencyGraph::from_tree(&tree);
    (temp, tree, graph)
  }

  fn settings(mode: Mode) -> Settings {
    Settings {
      task: Some("check".to_string()),
      mode,
      ..Settings::default()
    }
  }

  fn changes(tree: &ModuleTree, paths: &[&str]) -> ChangeSet {
    let filter = ChangeFilter::default();
    ChangeSet::from_paths(
      tree.root_dir(),
      paths.iter().map(|p| p.to_string()).collect(),
      &filter,
    )
    .unwrap()
  }

  fn path(s: &str) -> ModulePath {
    ModulePath::parse(s).unwrap()
  }

  #[test]
  fn change_in_core_affects_the_whole_chain() {
    let (_temp, tree, graph) = chain();
    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["core/src/lib.rs"]),
      &settings(Mode::IncludeDependents),
    );

    assert_eq!(
      run_set.affected,
      [path(":core"), path(":lib"), path(":app")].into()
    );
    assert!(run_set.should_run(&path(":app")));
    assert!(!run_set.should_run(&ModulePath::root()));
  }

  #[test]
  fn only_directly_skips_the_closure() {
    let (_temp, tree, graph) = chain();
    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["core/src/lib.rs"]),
      &settings(Mode::OnlyDirectly),
    );

    assert_eq!(run_set.affected, [path(":core")].into());
    assert!(!run_set.should_run(&path(":lib")));
    assert!(!run_set.should_run(&path(":app")));
  }

  #[test]
  fn change_in_a_leaf_affects_only_the_leaf() {
    let (_temp, tree, graph) = chain();
    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["app/src/main.rs"]),
      &settings(Mode::IncludeDependents),
    );

    assert_eq!(run_set.affected, [path(":app")].into());
  }

  #[test]
  fn empty_change_set_is_a_no_op_even_for_always_run() {
    let (_temp, tree, graph) = chain();
    let mut settings = settings(Mode::IncludeDependents);
    settings.always_run.insert(":app".to_string());

    let run_set = resolve(&tree, &graph, &ChangeSet::default(), &settings);
    for module in tree.modules() {
      assert!(!run_set.should_run(&module.path));
    }
  }

  #[test]
  fn affects_all_marks_everything_and_skips_ownership() {
    let (_temp, tree, graph) = chain();
    let change_set = ChangeSet {
      files: vec![tree.root_dir().join("build-logic/deps.toml")],
      affects_all: true,
    };

    let run_set = resolve(&tree, &graph, &change_set, &settings(Mode::IncludeDependents));
    assert!(run_set.affects_all);
    assert!(run_set.affected.is_empty());
    for module in tree.modules() {
      assert!(run_set.should_run(&module.path));
    }
  }

  #[test]
  fn never_run_wins_over_everything() {
    let (_temp, tree, graph) = chain();
    let mut settings = settings(Mode::IncludeDependents);
    settings.always_run.insert(":app".to_string());
    settings.never_run.insert(":app".to_string());

    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["app/src/main.rs"]),
      &settings,
    );
    assert!(!run_set.should_run(&path(":app")));
  }

  #[test]
  fn always_run_fires_on_any_surviving_change() {
    let (_temp, tree, graph) = chain();
    let mut settings = settings(Mode::IncludeDependents);
    settings.always_run.insert(":app".to_string());

    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["core/README.txt"]),
      &settings,
    );
    assert!(run_set.should_run(&path(":app")));
  }

  #[test]
  fn overrides_naming_unknown_modules_are_skipped() {
    let (_temp, tree, graph) = chain();
    let mut settings = settings(Mode::IncludeDependents);
    settings.always_run.insert(":ghost".to_string());

    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["core/src/lib.rs"]),
      &settings,
    );
    assert!(run_set.always_run.is_empty());
  }

  #[test]
  fn unowned_files_attribute_to_the_root_module() {
    let (_temp, tree, graph) = chain();
    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["README.md"]),
      &settings(Mode::IncludeDependents),
    );
    assert_eq!(run_set.affected, [ModulePath::root()].into());
  }

  #[test]
  fn out_of_tree_files_are_dropped() {
    let (_temp, tree, graph) = chain();
    let elsewhere = tempfile::tempdir().unwrap();
    let change_set = ChangeSet {
      files: vec![elsewhere.path().join("file.txt")],
      affects_all: false,
    };

    let run_set = resolve(&tree, &graph, &change_set, &settings(Mode::IncludeDependents));
    assert!(run_set.affected.is_empty());
    // Not the no-op case: the change list was non-empty, so overrides did
    // resolve; but nothing is affected.
    assert!(!run_set.should_run(&ModulePath::root()));
  }

  #[test]
  fn resolve_is_deterministic() {
    let (_temp, tree, graph) = chain();
    let change_set = changes(&tree, &["core/src/lib.rs", "lib/src/lib.rs"]);
    let settings = settings(Mode::IncludeDependents);

    let first = resolve(&tree, &graph, &change_set, &settings);
    let second = resolve(&tree, &graph, &change_set, &settings);
    assert_eq!(first.affected, second.affected);
    assert_eq!(first.always_run, second.always_run);
    assert_eq!(first.never_run, second.never_run);
  }

  #[test]
  fn run_set_serializes_for_reporting() {
    let (_temp, tree, graph) = chain();
    let run_set = resolve(
      &tree,
      &graph,
      &changes(&tree, &["core/src/lib.rs"]),
      &settings(Mode::IncludeDependents),
    );

    let json = serde_json::to_value(&run_set).unwrap();
    assert_eq!(json["affects_all"], serde_json::Value::Bool(false));
    assert!(json["affected"].as_array().unwrap().contains(&":core".into()));
  }
}
