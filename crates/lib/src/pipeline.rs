//! Run orchestration: loader task feeding the generator.
//!
//! The loader streams definitions and failures on two channels; this module is
//! the single consumer and the only caller of [`Generator::write`]. The run ends
//! when both channels are drained and closed, when the timeout elapses, or when
//! the shutdown future resolves. In every case the scripts are closed with
//! whatever has been written.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::GeneratorConfig;
use crate::generate::{GenerateSummary, Generator};
use crate::loader::spawn_loader;

/// Maximum time a run may take before it is closed early.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RunOptions {
  pub patches_dir: PathBuf,
  pub generator: GeneratorConfig,
  pub timeout: Duration,
}

impl RunOptions {
  pub fn new(patches_dir: impl Into<PathBuf>, generator: GeneratorConfig) -> Self {
    Self {
      patches_dir: patches_dir.into(),
      generator,
      timeout: DEFAULT_TIMEOUT,
    }
  }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
  /// Every definition was delivered and processed.
  Completed,
  /// The timeout elapsed first.
  TimedOut,
  /// The shutdown future resolved; `signal` names what triggered it.
  Interrupted { signal: String },
}

/// Counters and outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub stop: StopReason,
  pub total: usize,
  pub good: usize,
  pub errors: usize,
  pub summary: GenerateSummary,
}

impl RunReport {
  pub fn is_interrupted(&self) -> bool {
    matches!(self.stop, StopReason::Interrupted { .. })
  }
}

/// Load every definition under `options.patches_dir` and generate the scripts.
///
/// `shutdown` resolves with a description of the interrupt (e.g. a signal
/// name); pass [`std::future::pending`] when there is none.
pub async fn run<F>(options: RunOptions, shutdown: F) -> RunReport
where
  F: Future<Output = String>,
{
  let mut generator = Generator::open(options.generator);
  let mut loader = spawn_loader(options.patches_dir);

  let mut good = 0usize;
  let mut errors = 0usize;
  let mut results_open = true;
  let mut errors_open = true;

  let deadline = tokio::time::sleep(options.timeout);
  tokio::pin!(deadline);
  tokio::pin!(shutdown);

  let stop = loop {
    if !results_open && !errors_open {
      break StopReason::Completed;
    }

    tokio::select! {
      biased;

      signal = &mut shutdown => {
        warn!(signal = %signal, "received shutdown request, closing scripts");
        break StopReason::Interrupted { signal };
      }
      () = &mut deadline => {
        warn!(timeout = ?options.timeout, "timed out waiting for patch definitions, closing scripts");
        break StopReason::TimedOut;
      }
      maybe = loader.errors.recv(), if errors_open => match maybe {
        Some(e) => {
          error!(file_loc = %e.file_loc.display(), error = %e.kind, "received error");
          errors += 1;
        }
        None => errors_open = false,
      },
      maybe = loader.results.recv(), if results_open => match maybe {
        Some(def) => {
          info!(file_loc = %def.file_loc.display(), name = %def.name, "received result");
          generator.write(&def);
          good += 1;
        }
        None => results_open = false,
      },
    }
  };

  if stop != StopReason::Completed {
    loader.handle.abort();
  }

  let summary = generator.close();
  let report = RunReport {
    stop,
    total: good + errors,
    good,
    errors,
    summary,
  };

  debug!(
    total = report.total,
    good = report.good,
    errors = report.errors,
    "processing is done"
  );

  report
}
