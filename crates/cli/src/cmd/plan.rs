//! Implementation of the `affected plan` command.
//!
//! Computes the run-set and prints the decision per module without
//! executing anything.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use affected_lib::manifest::Mode;
use affected_lib::resolve::resolve;
use affected_lib::tree::ModulePath;

use crate::output::{self, OutputFormat, symbols};

use super::{ChangeArgs, Workspace};

#[derive(Serialize)]
struct PlanReport<'a> {
  task: &'a str,
  mode: Mode,
  affects_all: bool,
  run: Vec<&'a ModulePath>,
  skip: Vec<&'a ModulePath>,
}

pub fn cmd_plan(
  manifest: &Path,
  changes: &ChangeArgs,
  format: OutputFormat,
  verbose: bool,
) -> Result<()> {
  let ws = Workspace::load(manifest, changes.task.as_deref(), changes.mode, verbose)?;
  let change_set = ws.change_set(changes)?;
  let run_set = resolve(&ws.tree, &ws.graph, &change_set, &ws.settings);

  let mut run = Vec::new();
  let mut skip = Vec::new();
  for module in ws.tree.modules() {
    if run_set.should_run(&module.path) {
      run.push(&module.path);
    } else {
      skip.push(&module.path);
    }
  }

  if format.is_json() {
    return output::print_json(&PlanReport {
      task: ws.task(),
      mode: ws.settings.mode,
      affects_all: run_set.affects_all,
      run,
      skip,
    });
  }

  println!("Plan for task '{}' ({} mode)", ws.task(), ws.settings.mode);
  for module in ws.tree.modules() {
    if run_set.should_run(&module.path) {
      println!(
        "  {} {}",
        symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
        module.path
      );
    } else {
      println!(
        "  {} {}",
        symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.dimmed()),
        module.path.if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  println!();
  if run.is_empty() {
    output::print_info("Nothing to run.");
  } else {
    output::print_info(&format!(
      "{} of {} module(s) to run",
      run.len(),
      ws.tree.len()
    ));
  }

  Ok(())
}
