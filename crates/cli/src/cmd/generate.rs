//! Generate command: load definitions and write the patch/revert scripts.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use patchfiles_lib::config::GeneratorConfig;
use patchfiles_lib::pipeline::{RunOptions, RunReport, StopReason, run};

use crate::output::{
  OutputFormat, format_duration, format_list, print_error, print_json, print_stat, print_success, print_warning,
};
use crate::shutdown::shutdown_signal;

/// How long a finished run waits for the loader's blocking task before exiting.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Args, Debug)]
pub struct GenerateArgs {
  /// Directory containing patch definition files
  #[arg(short, long, default_value = "patches")]
  pub patches: PathBuf,

  /// Directory the scripts are written to
  #[arg(long, default_value = ".")]
  pub output_dir: PathBuf,

  /// Target environment (overrides ENVIRONMENT)
  #[arg(short, long)]
  pub environment: Option<String>,

  /// Sentinel file the scripts create and remove (overrides PATCHFILES_CONTROL_FILE)
  #[arg(long)]
  pub control_file: Option<String>,

  /// Give up waiting for definitions after this long (e.g. "10s", "1m")
  #[arg(long, value_parser = humantime::parse_duration, default_value = "10s")]
  pub timeout: Duration,

  /// Output format
  #[arg(long, value_enum, default_value = "text")]
  pub format: OutputFormat,
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
  environment: &'a str,
  duration_ms: u128,
  #[serde(flatten)]
  report: &'a RunReport,
}

/// Run the generator with the given arguments.
///
/// Exits the process with status 1 when the run was interrupted by a signal,
/// after the scripts have been closed.
pub fn cmd_generate(args: GenerateArgs) -> Result<()> {
  let config = build_config(&args);
  let environment = config.environment.clone();

  let mut options = RunOptions::new(&args.patches, config);
  options.timeout = args.timeout;

  info!(
    patches = %args.patches.display(),
    output_dir = %args.output_dir.display(),
    environment = %environment,
    "patchfiles started"
  );

  let start = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(run(options, shutdown_signal()));
  finish_runtime(rt);
  let elapsed = start.elapsed();

  if args.format.is_json() {
    print_json(&GenerateOutput {
      environment: &environment,
      duration_ms: elapsed.as_millis(),
      report: &report,
    })?;
  } else {
    print_report(&report, &environment, elapsed);
  }

  if report.is_interrupted() {
    std::process::exit(1);
  }

  Ok(())
}

/// Shut the runtime down without joining a loader still stuck in a blocking read.
fn finish_runtime(rt: tokio::runtime::Runtime) {
  rt.shutdown_timeout(SHUTDOWN_GRACE);
}

fn build_config(args: &GenerateArgs) -> GeneratorConfig {
  let mut config = GeneratorConfig::from_env().with_output_dir(&args.output_dir);
  if let Some(environment) = &args.environment {
    config = config.with_environment(environment);
  }
  if let Some(control_file) = &args.control_file {
    config = config.with_control_file(control_file.trim());
  }
  config
}

fn print_report(report: &RunReport, environment: &str, elapsed: Duration) {
  match &report.stop {
    StopReason::Completed => print_success(&format!("Generated scripts for '{}'", environment)),
    StopReason::TimedOut => print_warning("Timed out waiting for patch definitions, scripts may be incomplete"),
    StopReason::Interrupted { signal } => print_warning(&format!("Interrupted by {}, scripts may be incomplete", signal)),
  }

  let summary = &report.summary;
  print_stat("Definitions", &report.total.to_string());
  print_stat("Loaded", &report.good.to_string());
  print_stat("Load errors", &report.errors.to_string());
  print_stat("Render failures", &summary.render_failures.to_string());
  print_stat("Patches", &format_list(&summary.names));
  print_stat("Categories", &format_list(&summary.categories));
  print_stat("Patch script", &script_label(summary.patch_script.as_deref()));
  print_stat("Revert script", &script_label(summary.revert_script.as_deref()));
  print_stat("Duration", &format_duration(elapsed));

  if summary.patch_script.is_none() || summary.revert_script.is_none() {
    print_error("One or more scripts could not be written, see the log for details");
  }
}

fn script_label(path: Option<&Path>) -> String {
  match path {
    Some(path) => path.display().to_string(),
    None => "not written".to_string(),
  }
}
