//! Output artifact for one generated script.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum SinkError {
  #[error("failed to create script {}: {source}", path.display())]
  Create { path: PathBuf, source: io::Error },

  #[error("failed to set permissions on {}: {source}", path.display())]
  SetPermissions { path: PathBuf, source: io::Error },

  #[error("failed to write script {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

/// Append-only writer for one script file.
///
/// A sink whose file could not be created, or that hit a write error, is
/// inert: further appends are dropped.
#[derive(Debug)]
pub struct ScriptSink {
  path: PathBuf,
  writer: Option<BufWriter<File>>,
}

impl ScriptSink {
  /// Create or truncate `path` and mark it executable.
  pub fn create(path: &Path) -> Result<Self, SinkError> {
    let file = File::create(path).map_err(|e| SinkError::Create {
      path: path.to_path_buf(),
      source: e,
    })?;
    make_executable(path)?;

    Ok(Self {
      path: path.to_path_buf(),
      writer: Some(BufWriter::new(file)),
    })
  }

  /// A sink that discards everything.
  pub fn inert(path: &Path) -> Self {
    Self {
      path: path.to_path_buf(),
      writer: None,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn is_open(&self) -> bool {
    self.writer.is_some()
  }

  /// Append `text`. On failure the error is logged and the sink turns inert.
  pub fn append(&mut self, text: &str) {
    let Some(writer) = self.writer.as_mut() else {
      return;
    };
    if let Err(e) = writer.write_all(text.as_bytes()) {
      error!(path = %self.path.display(), error = %e, "failed to write script, dropping further output");
      self.writer = None;
    }
  }

  /// Flush and sync the file. Returns the path if the sink was still open.
  pub fn finish(self) -> Result<Option<PathBuf>, SinkError> {
    let Some(writer) = self.writer else {
      return Ok(None);
    };
    let file = writer.into_inner().map_err(|e| SinkError::Write {
      path: self.path.clone(),
      source: e.into_error(),
    })?;
    file.sync_all().map_err(|e| SinkError::Write {
      path: self.path.clone(),
      source: e,
    })?;
    Ok(Some(self.path))
  }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), SinkError> {
  use std::os::unix::fs::PermissionsExt;

  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
    SinkError::SetPermissions {
      path: path.to_path_buf(),
      source: e,
    }
  })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), SinkError> {
  Ok(())
}
