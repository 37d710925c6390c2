//! Reverse dependency graph and transitive dependent closure.
//!
//! The graph is built once from the module tree and is immutable for the
//! rest of the invocation. Edges point from a dependency to its dependents,
//! so walking outgoing edges answers "who is affected when this changes".

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::trace;

use crate::tree::{ModulePath, ModuleTree};

/// Reverse adjacency over the module dependency declarations.
#[derive(Debug)]
pub struct DependencyGraph {
  /// The underlying graph; an edge `a -> b` means "b depends on a".
  graph: DiGraph<ModulePath, ()>,

  /// Map from module path to node index.
  nodes: HashMap<ModulePath, NodeIndex>,
}

impl DependencyGraph {
  /// Build the reverse dependency graph from the tree.
  ///
  /// Dependencies naming modules outside the tree are not module-to-module
  /// edges and are skipped, as are self-references: a self-edge must never be
  /// the reason a module ends up in its own closure.
  pub fn from_tree(tree: &ModuleTree) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for module in tree.modules() {
      let idx = graph.add_node(module.path.clone());
      nodes.insert(module.path.clone(), idx);
    }

    for module in tree.modules() {
      let dependent_idx = nodes[&module.path];
      for dep in &module.deps {
        if *dep == module.path {
          trace!(module = %module.path, "skipping self-dependency");
          continue;
        }
        let Some(&dep_idx) = nodes.get(dep) else {
          trace!(module = %module.path, dep = %dep, "skipping dependency on unknown module");
          continue;
        };
        // Edge from dependency to dependent
        graph.add_edge(dep_idx, dependent_idx, ());
      }
    }

    Self { graph, nodes }
  }

  /// Modules that directly depend on `path`.
  pub fn direct_dependents(&self, path: &ModulePath) -> BTreeSet<ModulePath> {
    let Some(&idx) = self.nodes.get(path) else {
      return BTreeSet::new();
    };

    self
      .graph
      .neighbors_directed(idx, Direction::Outgoing)
      .map(|i| self.graph[i].clone())
      .collect()
  }

  /// All modules transitively depending on any module in `seeds`.
  ///
  /// Worklist traversal with a single visited set shared across all seeds:
  /// each module's dependents are expanded at most once, which both bounds
  /// the work and guarantees termination on cyclic input. Seeds are part of
  /// the result only when reached as a dependent of another module.
  pub fn dependent_closure(&self, seeds: &BTreeSet<ModulePath>) -> BTreeSet<ModulePath> {
    let mut result = BTreeSet::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();

    for seed in seeds {
      if let Some(&idx) = self.nodes.get(seed)
        && visited.insert(idx)
      {
        queue.push_back(idx);
      }
    }

    while let Some(idx) = queue.pop_front() {
      for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
        result.insert(self.graph[dependent].clone());
        if visited.insert(dependent) {
          queue.push_back(dependent);
        }
      }
    }

    result
  }

  /// The number of dependency edges in the graph.
  pub fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;
  use crate::manifest::types::ModuleDecl;

  fn decl(path: &str, dir: &str, deps: &[&str]) -> ModuleDecl {
    ModuleDecl {
      path: path.to_string(),
      dir: dir.to_string(),
      deps: deps.iter().map(|d| d.to_string()).collect(),
    }
  }

  /// Build a tree with one directory per declared module.
  fn tree(decls: Vec<ModuleDecl>) -> (tempfile::TempDir, ModuleTree) {
    let temp = tempfile::tempdir().unwrap();
    for decl in &decls {
      std::fs::create_dir_all(temp.path().join(&decl.dir)).unwrap();
    }
    let manifest = Manifest {
      modules: decls,
      ..Manifest::default()
    };
    let tree = ModuleTree::from_manifest(temp.path(), &manifest).unwrap();
    (temp, tree)
  }

  fn path(s: &str) -> ModulePath {
    ModulePath::parse(s).unwrap()
  }

  fn seeds(paths: &[&str]) -> BTreeSet<ModulePath> {
    paths.iter().map(|p| path(p)).collect()
  }

  #[test]
  fn empty_tree_has_no_edges() {
    let (_temp, tree) = tree(vec![]);
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(graph.edge_count(), 0);
    assert!(graph.dependent_closure(&seeds(&[":"])).is_empty());
  }

  #[test]
  fn direct_dependents_are_grouped_by_dependency() {
    // Both :lib and :app depend on :core.
    let (_temp, tree) = tree(vec![
      decl(":core", "core", &[]),
      decl(":lib", "lib", &[":core"]),
      decl(":app", "app", &[":core"]),
    ]);
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(graph.direct_dependents(&path(":core")), seeds(&[":lib", ":app"]));
    assert!(graph.direct_dependents(&path(":app")).is_empty());
  }

  #[test]
  fn closure_follows_the_dependent_direction_only() {
    // :app depends on :lib depends on :core.
    let (_temp, tree) = tree(vec![
      decl(":core", "core", &[]),
      decl(":lib", "lib", &[":core"]),
      decl(":app", "app", &[":lib"]),
    ]);
    let graph = DependencyGraph::from_tree(&tree);

    // Dependents flow dependency -> dependent, never the reverse.
    assert!(graph.dependent_closure(&seeds(&[":app"])).is_empty());
    assert_eq!(graph.dependent_closure(&seeds(&[":lib"])), seeds(&[":app"]));
    assert_eq!(
      graph.dependent_closure(&seeds(&[":core"])),
      seeds(&[":lib", ":app"])
    );
  }

  #[test]
  fn closure_is_idempotent() {
    let (_temp, tree) = tree(vec![
      decl(":core", "core", &[]),
      decl(":lib", "lib", &[":core"]),
      decl(":app", "app", &[":lib"]),
    ]);
    let graph = DependencyGraph::from_tree(&tree);

    let first = graph.dependent_closure(&seeds(&[":core"]));
    let second = graph.dependent_closure(&seeds(&[":core"]));
    assert_eq!(first, second);
  }

  #[test]
  fn diamond_dependents_are_not_double_counted() {
    //     :base
    //     /   \
    //  :left  :right
    //     \   /
    //     :top
    let (_temp, tree) = tree(vec![
      decl(":base", "base", &[]),
      decl(":left", "left", &[":base"]),
      decl(":right", "right", &[":base"]),
      decl(":top", "top", &[":left", ":right"]),
    ]);
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(
      graph.dependent_closure(&seeds(&[":base"])),
      seeds(&[":left", ":right", ":top"])
    );
  }

  #[test]
  fn cyclic_graph_terminates_and_covers_the_cycle() {
    // :a and :b mutually dependent; invalid configuration, but the closure
    // must terminate and include both exactly once.
    let (_temp, tree) = tree(vec![decl(":a", "a", &[":b"]), decl(":b", "b", &[":a"])]);
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(graph.dependent_closure(&seeds(&[":a"])), seeds(&[":a", ":b"]));
  }

  #[test]
  fn self_dependency_is_ignored() {
    let (_temp, tree) = tree(vec![decl(":a", "a", &[":a"])]);
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(graph.edge_count(), 0);
    assert!(graph.dependent_closure(&seeds(&[":a"])).is_empty());
  }

  #[test]
  fn unknown_dependency_is_ignored() {
    let (_temp, tree) = tree(vec![decl(":app", "app", &[":not-in-tree"])]);
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(graph.edge_count(), 0);
  }

  #[test]
  fn shared_visited_set_across_multiple_seeds() {
    let (_temp, tree) = tree(vec![
      decl(":core", "core", &[]),
      decl(":lib", "lib", &[":core"]),
      decl(":app", "app", &[":lib"]),
    ]);
    let graph = DependencyGraph::from_tree(&tree);

    // :lib is both a seed and a dependent of :core; it still appears once
    // and its own dependents are still expanded.
    assert_eq!(
      graph.dependent_closure(&seeds(&[":core", ":lib"])),
      seeds(&[":lib", ":app"])
    );
  }
}
