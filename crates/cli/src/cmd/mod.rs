//! CLI command implementations.

mod info;
mod plan;
mod run;

pub use info::cmd_info;
pub use plan::cmd_plan;
pub use run::cmd_run;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use affected_lib::changes::{ChangeFilter, ChangeSet, DiffMode};
use affected_lib::graph::DependencyGraph;
use affected_lib::manifest::{Manifest, Mode, Settings};
use affected_lib::tree::ModuleTree;

/// Change-source selection shared by `plan` and `run`.
#[derive(Debug, clap::Args)]
pub struct ChangeArgs {
  /// Compare mode used to build the git diff
  #[arg(long, default_value_t = DiffMode::default())]
  pub compare_mode: DiffMode,

  /// Newer revision to diff (defaults to HEAD where the mode allows it)
  #[arg(long)]
  pub to: Option<String>,

  /// Base revision to diff against
  #[arg(long)]
  pub from: Option<String>,

  /// Read changed paths from stdin, one per line relative to the tree root,
  /// instead of invoking git
  #[arg(long)]
  pub stdin: bool,

  /// Override the configured task
  #[arg(long)]
  pub task: Option<String>,

  /// Override the configured mode
  #[arg(long)]
  pub mode: Option<Mode>,
}

/// Everything a command needs, built once from the manifest: effective
/// settings, the module tree index, the reverse dependency graph, and the
/// compiled change filters.
pub(crate) struct Workspace {
  pub root: PathBuf,
  pub settings: Settings,
  pub tree: ModuleTree,
  pub graph: DependencyGraph,
  pub filter: ChangeFilter,
}

impl Workspace {
  /// Load the manifest, merge CLI overrides, validate, and build the
  /// read-only indexes. Any failure here aborts before resolution starts.
  pub fn load(
    manifest_path: &Path,
    task: Option<&str>,
    mode: Option<Mode>,
    verbose: bool,
  ) -> Result<Self> {
    let manifest = Manifest::load(manifest_path)
      .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

    let mut settings = manifest.settings.clone();
    if let Some(task) = task {
      settings.task = Some(task.to_string());
    }
    if let Some(mode) = mode {
      settings.mode = mode;
    }

    init_logging(verbose || settings.debug);

    settings.validate().context("Invalid configuration")?;
    let filter = ChangeFilter::from_settings(&settings).context("Invalid configuration")?;

    let root = match manifest_path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };
    let tree = ModuleTree::from_manifest(&root, &manifest)
      .context("Failed to build the module tree")?;
    let graph = DependencyGraph::from_tree(&tree);

    Ok(Self {
      root: tree.root_dir().to_path_buf(),
      settings,
      tree,
      graph,
      filter,
    })
  }

  /// The validated task name.
  pub fn task(&self) -> &str {
    self.settings.task.as_deref().unwrap_or_default()
  }

  /// Obtain the change set from the provider selected on the command line.
  pub fn change_set(&self, args: &ChangeArgs) -> Result<ChangeSet> {
    if args.stdin {
      let lines: Vec<String> = std::io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read changed paths from stdin")?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
      ChangeSet::from_paths(self.tree.root_dir(), lines, &self.filter)
        .context("Failed to build the change set from stdin")
    } else {
      ChangeSet::from_git(
        self.tree.root_dir(),
        args.compare_mode,
        args.to.as_deref(),
        args.from.as_deref(),
        &self.filter,
      )
      .context("Failed to obtain the changed files from git")
    }
  }
}

/// Initialize tracing to stderr; stdout stays reserved for command output.
fn init_logging(debug: bool) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .try_init()
    .ok();
}
