//! Discovery and decoding of patch definition files.
//!
//! Every regular `.yaml`/`.yml` file directly inside the patches directory is
//! one definition. Each file produces exactly one outcome: a [`NamedPatch`] or
//! a [`LoadError`] carrying the file location. Files are visited in file-name
//! order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::definition::{NamedPatch, Patch};

const EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, Error)]
pub enum LoadErrorKind {
  #[error("failed to read patches directory: {0}")]
  ReadDir(#[source] walkdir::Error),

  #[error("failed to read file: {0}")]
  Read(#[source] io::Error),

  #[error("failed to parse YAML: {0}")]
  Parse(#[source] serde_yaml::Error),

  #[error("file contains no patch definition")]
  Empty,
}

/// A definition file (or the directory itself) that could not be loaded.
#[derive(Debug, Error)]
#[error("{}: {kind}", file_loc.display())]
pub struct LoadError {
  pub file_loc: PathBuf,
  pub kind: LoadErrorKind,
}

/// Outcome for one definition file.
pub type LoadOutcome = Result<NamedPatch, LoadError>;

/// Load a single definition file.
pub fn load_file(path: &Path) -> LoadOutcome {
  let fail = |kind| LoadError {
    file_loc: path.to_path_buf(),
    kind,
  };

  let content = fs::read_to_string(path).map_err(|e| fail(LoadErrorKind::Read(e)))?;
  let patch: Option<Patch> = serde_yaml::from_str(&content).map_err(|e| fail(LoadErrorKind::Parse(e)))?;
  let patch = patch.ok_or_else(|| fail(LoadErrorKind::Empty))?;

  Ok(NamedPatch::from_path(path, patch))
}

/// List the definition files in `dir`, sorted by file name.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
  let mut files = Vec::new();

  for entry in WalkDir::new(dir)
    .min_depth(1)
    .max_depth(1)
    .sort_by_file_name()
  {
    let entry = entry.map_err(|e| LoadError {
      file_loc: dir.to_path_buf(),
      kind: LoadErrorKind::ReadDir(e),
    })?;

    if !is_regular_file(&entry) {
      debug!(file_loc = %entry.path().display(), "skipping entry that is not a regular file");
      continue;
    }

    let path = entry.into_path();
    let is_definition = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| EXTENSIONS.contains(&ext));
    if !is_definition {
      debug!(file_loc = %path.display(), "skipping non-YAML file");
      continue;
    }
    files.push(path);
  }

  Ok(files)
}

// Symlinks are not followed by the walk; a link counts when its target is a
// regular file, and a dangling link is skipped rather than failing the walk.
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
  if entry.path_is_symlink() {
    fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
  } else {
    entry.file_type().is_file()
  }
}

/// Load every definition in `dir`, in file-name order.
pub fn load_dir(dir: &Path) -> Result<Vec<LoadOutcome>, LoadError> {
  Ok(discover(dir)?.iter().map(|path| load_file(path)).collect())
}

/// Receiving ends of a running loader.
#[derive(Debug)]
pub struct LoaderChannels {
  pub results: UnboundedReceiver<NamedPatch>,
  pub errors: UnboundedReceiver<LoadError>,
  pub handle: JoinHandle<()>,
}

/// Spawn a task that loads `dir` and streams outcomes on two channels.
///
/// Both senders are dropped once every file has been visited, so the
/// receivers observe the end of the run as a closed channel.
pub fn spawn_loader(dir: PathBuf) -> LoaderChannels {
  let (result_tx, results) = unbounded_channel();
  let (error_tx, errors) = unbounded_channel();

  let handle = tokio::task::spawn_blocking(move || produce(&dir, &result_tx, &error_tx));

  LoaderChannels {
    results,
    errors,
    handle,
  }
}

fn produce(dir: &Path, results: &UnboundedSender<NamedPatch>, errors: &UnboundedSender<LoadError>) {
  let files = match discover(dir) {
    Ok(files) => files,
    Err(e) => {
      warn!(file_loc = %dir.display(), error = %e.kind, "failed to enumerate patches");
      let _ = errors.send(e);
      return;
    }
  };

  info!(dir = %dir.display(), count = files.len(), "loading patch definitions");

  for path in files {
    debug!(file_loc = %path.display(), "attempt to parse file");
    let sent = match load_file(&path) {
      Ok(def) => {
        debug!(file_loc = %path.display(), name = %def.name, "successfully parsed file");
        results.send(def).is_ok()
      }
      Err(e) => {
        warn!(file_loc = %path.display(), error = %e.kind, "failed to load patch definition");
        errors.send(e).is_ok()
      }
    };
    if !sent {
      debug!("consumer gone, stopping loader");
      return;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::definition::WriteMode;
  use tempfile::TempDir;

  const SSHD: &str = r##"
output: /etc/ssh/sshd_config
mode: overwrite
body: PermitRootLogin no
commentCharacter: "#"
categories: [security]
description: Disable root login
"##;

  const LIMITS: &str = r##"
output: /etc/security/limits.conf
mode: append
body: "* soft nofile 4096"
commentCharacter: "#"
"##;

  fn patches_dir(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
      fs::write(temp.path().join(name), content).unwrap();
    }
    temp
  }

  #[test]
  fn load_file_derives_names() {
    let temp = patches_dir(&[("sshd_harden.yaml", SSHD)]);

    let def = load_file(&temp.path().join("sshd_harden.yaml")).unwrap();

    assert_eq!(def.name, "sshd_harden");
    assert_eq!(def.name_short, "sshd");
    assert_eq!(def.file_loc, temp.path().join("sshd_harden.yaml"));
    assert_eq!(def.patch.output, "/etc/ssh/sshd_config");
    assert_eq!(def.patch.categories, vec!["security"]);
    assert_eq!(def.patch.comment_character, "#");
  }

  #[test]
  fn load_file_reports_parse_errors_with_location() {
    let temp = patches_dir(&[("broken.yaml", "output: [unclosed")]);
    let path = temp.path().join("broken.yaml");

    let err = load_file(&path).unwrap_err();

    assert_eq!(err.file_loc, path);
    assert!(matches!(err.kind, LoadErrorKind::Parse(_)));
    assert!(err.to_string().contains("broken.yaml"));
  }

  #[test]
  fn load_file_rejects_empty_document() {
    let temp = patches_dir(&[("empty.yaml", "~\n")]);

    let err = load_file(&temp.path().join("empty.yaml")).unwrap_err();

    assert!(matches!(err.kind, LoadErrorKind::Empty));
  }

  #[test]
  fn load_file_reports_missing_file() {
    let temp = TempDir::new().unwrap();

    let err = load_file(&temp.path().join("nope.yaml")).unwrap_err();

    assert!(matches!(err.kind, LoadErrorKind::Read(_)));
  }

  #[test]
  fn load_dir_visits_yaml_files_in_name_order() {
    let temp = patches_dir(&[
      ("sshd_harden.yaml", SSHD),
      ("limits_nofile.yml", LIMITS),
      ("README.md", "not a patch"),
      ("broken.yaml", "output: [unclosed"),
    ]);
    fs::create_dir(temp.path().join("nested.yaml")).unwrap();

    let outcomes = load_dir(temp.path()).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_err());
    let limits = outcomes[1].as_ref().unwrap();
    assert_eq!(limits.name, "limits_nofile");
    assert_eq!(limits.patch.mode, WriteMode::Append);
    assert_eq!(outcomes[2].as_ref().unwrap().name, "sshd_harden");
  }

  #[cfg(unix)]
  #[test]
  fn discover_includes_symlinked_definitions() {
    let temp = patches_dir(&[]);
    let elsewhere = TempDir::new().unwrap();
    fs::write(elsewhere.path().join("sshd_harden.yaml"), SSHD).unwrap();
    std::os::unix::fs::symlink(
      elsewhere.path().join("sshd_harden.yaml"),
      temp.path().join("sshd_harden.yaml"),
    )
    .unwrap();
    std::os::unix::fs::symlink(temp.path().join("gone.yaml"), temp.path().join("dangling.yaml")).unwrap();

    let files = discover(temp.path()).unwrap();

    assert_eq!(files, vec![temp.path().join("sshd_harden.yaml")]);
    let def = load_file(&files[0]).unwrap();
    assert_eq!(def.name, "sshd_harden");
  }

  #[test]
  fn load_dir_fails_for_missing_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let err = load_dir(&missing).unwrap_err();

    assert_eq!(err.file_loc, missing);
    assert!(matches!(err.kind, LoadErrorKind::ReadDir(_)));
  }

  #[tokio::test]
  async fn spawn_loader_streams_each_file_once() {
    let temp = patches_dir(&[
      ("sshd_harden.yaml", SSHD),
      ("limits_nofile.yaml", LIMITS),
      ("broken.yaml", "output: [unclosed"),
    ]);

    let mut channels = spawn_loader(temp.path().to_path_buf());

    let mut names = Vec::new();
    while let Some(def) = channels.results.recv().await {
      names.push(def.name);
    }
    let mut errors = Vec::new();
    while let Some(err) = channels.errors.recv().await {
      errors.push(err.file_loc);
    }
    channels.handle.await.unwrap();

    assert_eq!(names, vec!["limits_nofile", "sshd_harden"]);
    assert_eq!(errors, vec![temp.path().join("broken.yaml")]);
  }

  #[tokio::test]
  async fn spawn_loader_reports_unreadable_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let mut channels = spawn_loader(missing.clone());

    assert!(channels.results.recv().await.is_none());
    let err = channels.errors.recv().await.unwrap();
    assert_eq!(err.file_loc, missing);
    assert!(channels.errors.recv().await.is_none());
  }
}
