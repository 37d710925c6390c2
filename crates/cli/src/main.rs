//! affected: run a build task only on the modules affected by a change.

mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use affected_lib::consts::DEFAULT_MANIFEST;

use cmd::ChangeArgs;
use output::OutputFormat;

#[derive(Parser)]
#[command(
  name = "affected",
  version,
  about = "Run a build task only on modules affected by a set of changed files"
)]
struct Cli {
  /// Path to the build tree manifest
  #[arg(short, long, global = true, default_value = DEFAULT_MANIFEST)]
  manifest: PathBuf,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show which modules would run, without executing anything
  Plan {
    #[command(flatten)]
    changes: ChangeArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Execute the task on every module in the run-set
  Run {
    #[command(flatten)]
    changes: ChangeArgs,

    /// Extra arguments passed to the runner, after `--`
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Print the effective settings, module tree, and dependents map
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Plan { changes, format } => cmd::cmd_plan(&cli.manifest, &changes, format, cli.verbose),
    Commands::Run { changes, args } => cmd::cmd_run(&cli.manifest, &changes, &args, cli.verbose),
    Commands::Info => cmd::cmd_info(&cli.manifest, cli.verbose),
  }
}
