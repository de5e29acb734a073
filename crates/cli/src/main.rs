mod cmd;
mod output;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{GenerateArgs, cmd_generate, cmd_list};
use output::OutputFormat;

/// patchfiles - generate paired patch/revert scripts from YAML patch definitions
#[derive(Parser)]
#[command(name = "patchfiles")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overrides RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate the patch and revert scripts
  Generate(GenerateArgs),

  /// List the patch definitions that would be used
  List {
    /// Directory containing patch definition files
    #[arg(short, long, default_value = "patches")]
    patches: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();

  match cli.command {
    Commands::Generate(args) => cmd_generate(args),
    Commands::List { patches, format } => cmd_list(&patches, format),
  }
}
