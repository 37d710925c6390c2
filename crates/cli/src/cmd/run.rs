//! Implementation of the `affected run` command.
//!
//! Computes the run-set and spawns the runner once per module, with the
//! tree root as working directory. Output streams straight through; a
//! non-zero exit aborts the remaining modules.

use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::info;

use affected_lib::resolve::resolve;

use crate::output;

use super::{ChangeArgs, Workspace};

pub fn cmd_run(
  manifest: &Path,
  changes: &ChangeArgs,
  extra_args: &[String],
  verbose: bool,
) -> Result<()> {
  let ws = Workspace::load(manifest, changes.task.as_deref(), changes.mode, verbose)?;
  let change_set = ws.change_set(changes)?;
  let run_set = resolve(&ws.tree, &ws.graph, &change_set, &ws.settings);

  let to_run = run_set.modules_to_run(&ws.tree);
  if to_run.is_empty() {
    output::print_info("Nothing to run.");
    return Ok(());
  }

  let task = ws.task();
  let runner = ws
    .settings
    .runner
    .clone()
    .unwrap_or_else(|| default_runner().to_string());
  let mut parts = runner.split_whitespace();
  let program = parts.next().context("runner must not be empty")?;
  let runner_args: Vec<&str> = parts.collect();

  let start = Instant::now();
  for module in &to_run {
    let task_path = module.path.task_path(task);
    info!(module = %module.path, "running {} {} {}", runner, task_path, extra_args.join(" "));

    let status = Command::new(program)
      .args(&runner_args)
      .arg(&task_path)
      .args(extra_args)
      .current_dir(&ws.root)
      .status()
      .with_context(|| format!("Failed to start runner '{program}'"))?;

    if !status.success() {
      bail!("'{} {}' failed with {}", runner, task_path, status);
    }
  }

  let elapsed = Duration::from_millis(start.elapsed().as_millis() as u64);
  output::print_success(&format!(
    "Ran '{}' on {} module(s) in {}",
    task,
    to_run.len(),
    humantime::format_duration(elapsed)
  ));

  Ok(())
}

fn default_runner() -> &'static str {
  if cfg!(windows) { "gradlew.bat" } else { "./gradlew" }
}
