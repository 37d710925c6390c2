//! Implementation of the `affected info` command.
//!
//! Prints the effective settings, the module tree, and the reverse
//! dependents map; the first stop when the resolver picks modules you did
//! not expect.

use std::path::Path;

use anyhow::Result;

use crate::output::print_stat;

use super::Workspace;

pub fn cmd_info(manifest: &Path, verbose: bool) -> Result<()> {
  let ws = Workspace::load(manifest, None, None, verbose)?;

  println!("Settings:");
  print_stat("task", ws.task());
  print_stat("mode", ws.settings.mode.as_str());
  print_stat("always-run", &join(ws.settings.always_run.iter()));
  print_stat("never-run", &join(ws.settings.never_run.iter()));
  print_stat("ignore", &join(ws.settings.ignore.iter()));
  print_stat("affects-all", &join(ws.settings.affects_all.iter()));

  println!();
  println!("Modules:");
  for module in ws.tree.modules() {
    let dir = module.dir.strip_prefix(&ws.root).unwrap_or(&module.dir);
    let dir = if dir.as_os_str().is_empty() {
      Path::new(".")
    } else {
      dir
    };
    if module.deps.is_empty() {
      println!("  {} ({})", module.path, dir.display());
    } else {
      println!(
        "  {} ({}) deps: {}",
        module.path,
        dir.display(),
        join(module.deps.iter())
      );
    }
  }

  println!();
  println!("Dependents:");
  let mut any = false;
  for module in ws.tree.modules() {
    let dependents = ws.graph.direct_dependents(&module.path);
    if !dependents.is_empty() {
      println!("  {} <- {}", module.path, join(dependents.iter()));
      any = true;
    }
  }
  if !any {
    println!("  (none)");
  }

  Ok(())
}

fn join<I: IntoIterator<Item = T>, T: std::fmt::Display>(items: I) -> String {
  let joined = items
    .into_iter()
    .map(|item| item.to_string())
    .collect::<Vec<_>>()
    .join(", ");
  if joined.is_empty() { "(none)".to_string() } else { joined }
}
