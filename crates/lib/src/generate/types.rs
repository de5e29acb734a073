//! Types shared by the script renderers and the generator.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::definition::NamedPatch;

/// Errors that prevent a single fragment from being rendered.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("patch '{name}' has no output path")]
  MissingOutput { name: String },

  #[error("patch '{name}' has an output path containing a newline or NUL: {output:?}")]
  InvalidOutput { name: String, output: String },

  #[error("failed to format fragment: {0}")]
  Format(#[from] fmt::Error),
}

/// Which of the two generated scripts is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScriptPurpose {
  Patching,
  Reverting,
}

impl ScriptPurpose {
  pub fn as_str(&self) -> &'static str {
    match self {
      ScriptPurpose::Patching => "PATCHING",
      ScriptPurpose::Reverting => "REVERTING",
    }
  }

  /// File name stem of the generated artifact.
  pub fn stem(&self) -> &'static str {
    match self {
      ScriptPurpose::Patching => "patch",
      ScriptPurpose::Reverting => "revert",
    }
  }

  /// Artifact file name for an environment. Only `dev` gets a suffix.
  pub fn file_name(&self, environment: &str) -> String {
    if environment == crate::consts::DEFAULT_ENVIRONMENT {
      format!("{}_{}.sh", self.stem(), environment)
    } else {
      format!("{}.sh", self.stem())
    }
  }
}

impl fmt::Display for ScriptPurpose {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Values embedded in the header comment block and guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMetadata {
  pub environment: String,
  pub author: String,
  pub version: String,
  /// Build timestamp, already formatted.
  pub built: String,
  pub control_file: String,
}

/// Names and categories seen during a run, used for the footer help.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
  pub names: BTreeSet<String>,
  pub categories: BTreeSet<String>,
}

impl RunState {
  pub fn record(&mut self, def: &NamedPatch) {
    self.names.insert(def.name.clone());
    for category in &def.patch.categories {
      self.categories.insert(category.clone());
    }
  }
}

/// Outcome of a generator run, returned by [`Generator::close`](super::Generator::close).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateSummary {
  /// Definitions passed to `write`, including any whose fragments failed to render.
  pub received: usize,
  /// Fragments that failed to render, across both scripts.
  pub render_failures: usize,
  /// Path of the patch script, or `None` if it could not be opened.
  pub patch_script: Option<PathBuf>,
  /// Path of the revert script, or `None` if it could not be opened.
  pub revert_script: Option<PathBuf>,
  pub names: Vec<String>,
  pub categories: Vec<String>,
}
