//! Patch and revert script generation.
//!
//! The [`Generator`] owns both output scripts for a run:
//! - `open` creates the two files and writes their headers
//! - `write` renders one definition into a patch fragment and a revert fragment
//! - `close` appends the footers (usage help and control-file toggle) and syncs
//!
//! Rendering is pure string building; nothing on the target system is touched
//! until the generated scripts are executed.

mod category;
mod footer;
mod header;
mod patch;
mod revert;
mod shell;
mod sink;
mod types;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::config::GeneratorConfig;
use crate::definition::NamedPatch;

pub use category::CategorySelector;
pub use footer::{FooterContext, render_footer};
pub use header::render_header;
pub use patch::{backup_command, payload, render_patch, wrapped_body};
pub use revert::{render_revert, revert_command};
pub use sink::{ScriptSink, SinkError};
pub use types::{GenerateSummary, RenderError, RunState, ScriptMetadata, ScriptPurpose};

/// Format of the `built` header field.
pub const BUILT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// Single owner of the patch and revert scripts for one run.
#[derive(Debug)]
pub struct Generator {
  config: GeneratorConfig,
  patch: ScriptSink,
  revert: ScriptSink,
  state: RunState,
  received: usize,
  render_failures: usize,
}

impl Generator {
  /// Create both scripts and write their headers.
  ///
  /// A script that cannot be created is logged and left inert; the other one
  /// is still generated.
  pub fn open(config: GeneratorConfig) -> Self {
    let meta = ScriptMetadata {
      environment: config.environment.clone(),
      author: config.author.clone(),
      version: config.version.clone(),
      built: Utc::now().format(BUILT_FORMAT).to_string(),
      control_file: config.control_file.clone(),
    };

    let patch = open_sink(&config, ScriptPurpose::Patching, &meta);
    let revert = open_sink(&config, ScriptPurpose::Reverting, &meta);

    Self {
      config,
      patch,
      revert,
      state: RunState::default(),
      received: 0,
      render_failures: 0,
    }
  }

  /// Render one definition into both scripts.
  ///
  /// A render failure omits that fragment and is counted; it never stops the run.
  pub fn write(&mut self, def: &NamedPatch) {
    debug!(name = %def.name, file_loc = %def.file_loc.display(), "writing fragments");

    self.state.record(def);
    self.received += 1;

    match render_patch(def) {
      Ok(fragment) => self.patch.append(&fragment),
      Err(e) => {
        error!(name = %def.name, file_loc = %def.file_loc.display(), error = %e, "failed to render patch fragment");
        self.render_failures += 1;
      }
    }

    match render_revert(def) {
      Ok(fragment) => self.revert.append(&fragment),
      Err(e) => {
        error!(name = %def.name, file_loc = %def.file_loc.display(), error = %e, "failed to render revert fragment");
        self.render_failures += 1;
      }
    }
  }

  /// Names and categories recorded so far.
  pub fn state(&self) -> &RunState {
    &self.state
  }

  /// Append the footers and finish both scripts.
  pub fn close(self) -> GenerateSummary {
    let ctx = FooterContext {
      control_file: self.config.control_file.clone(),
      patch_script: ScriptPurpose::Patching.file_name(&self.config.environment),
      revert_script: ScriptPurpose::Reverting.file_name(&self.config.environment),
    };

    let mut patch = self.patch;
    let mut revert = self.revert;
    patch.append(&render_footer(ScriptPurpose::Patching, &self.state, &ctx));
    revert.append(&render_footer(ScriptPurpose::Reverting, &self.state, &ctx));

    let summary = GenerateSummary {
      received: self.received,
      render_failures: self.render_failures,
      patch_script: finish_sink(patch),
      revert_script: finish_sink(revert),
      names: self.state.names.into_iter().collect(),
      categories: self.state.categories.into_iter().collect(),
    };

    info!(
      received = summary.received,
      render_failures = summary.render_failures,
      "scripts closed"
    );

    summary
  }
}

fn open_sink(config: &GeneratorConfig, purpose: ScriptPurpose, meta: &ScriptMetadata) -> ScriptSink {
  let path = config.script_path(purpose);
  match ScriptSink::create(&path) {
    Ok(mut sink) => {
      debug!(path = %path.display(), purpose = %purpose, "writing header");
      sink.append(&render_header(purpose, meta));
      sink
    }
    Err(e) => {
      error!(path = %path.display(), error = %e, "failed to open script, its output will be dropped");
      ScriptSink::inert(&path)
    }
  }
}

fn finish_sink(sink: ScriptSink) -> Option<std::path::PathBuf> {
  let path = sink.path().to_path_buf();
  match sink.finish() {
    Ok(finished) => finished,
    Err(e) => {
      error!(path = %path.display(), error = %e, "failed to finish script");
      None
    }
  }
}
