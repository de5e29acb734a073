use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How the body is written to the target file.
///
/// Anything other than the exact string `append` decodes to [`WriteMode::Overwrite`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum WriteMode {
  /// Replace the whole file, keeping a sibling backup for revert.
  #[default]
  Overwrite,
  /// Add a marker-delimited block to the end of the file.
  Append,
}

impl WriteMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      WriteMode::Overwrite => "overwrite",
      WriteMode::Append => "append",
    }
  }

  /// Shell redirection operator used for the write.
  pub fn redirect(&self) -> &'static str {
    match self {
      WriteMode::Overwrite => ">",
      WriteMode::Append => ">>",
    }
  }
}

impl From<&str> for WriteMode {
  fn from(value: &str) -> Self {
    match value {
      "append" => WriteMode::Append,
      "overwrite" => WriteMode::Overwrite,
      other => {
        warn!(mode = %other, "unrecognized write mode, treating as overwrite");
        WriteMode::Overwrite
      }
    }
  }
}

impl From<String> for WriteMode {
  fn from(value: String) -> Self {
    WriteMode::from(value.as_str())
  }
}

impl fmt::Display for WriteMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single patch definition as written in a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
  /// Target file path where the body is written.
  pub output: String,
  #[serde(default)]
  pub mode: WriteMode,
  /// Literal content to install.
  #[serde(default)]
  pub body: String,
  /// Shell commands run after the write (and after revert), in order.
  #[serde(default)]
  pub commands_after: Vec<String>,
  /// Comment prefix of the target file's syntax, used to build the append markers.
  #[serde(default)]
  pub comment_character: String,
  #[serde(default)]
  pub categories: Vec<String>,
  #[serde(default)]
  pub description: String,
}

impl Patch {
  /// Start marker line for append mode, e.g. `# PATCHFILES START`.
  pub fn marker_start(&self) -> String {
    format!("{} {}", self.comment_character, crate::consts::MARKER_START)
  }

  /// End marker line for append mode, e.g. `# PATCHFILES END`.
  pub fn marker_end(&self) -> String {
    format!("{} {}", self.comment_character, crate::consts::MARKER_END)
  }

  /// Path of the backup copy taken before an overwrite.
  pub fn backup_path(&self) -> String {
    format!("{}{}", self.output, crate::consts::BACKUP_SUFFIX)
  }
}

/// A [`Patch`] together with the identity derived from its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedPatch {
  /// Source file name up to the first `.`.
  pub name: String,
  /// `name` up to the first `_`; acts as an implicit category.
  pub name_short: String,
  /// Where the definition was loaded from.
  pub file_loc: PathBuf,
  pub patch: Patch,
}

impl NamedPatch {
  pub fn new(name: impl Into<String>, file_loc: impl Into<PathBuf>, patch: Patch) -> Self {
    let name = name.into();
    let name_short = short_name(&name).to_string();
    Self {
      name,
      name_short,
      file_loc: file_loc.into(),
      patch,
    }
  }

  /// Build a named patch, deriving the name from the file name of `path`.
  pub fn from_path(path: &Path, patch: Patch) -> Self {
    Self::new(name_from_path(path), path, patch)
  }
}

/// Patch name for a definition file: the file name up to its first `.`.
pub fn name_from_path(path: &Path) -> String {
  let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
  file_name.split('.').next().unwrap_or_default().to_string()
}

fn short_name(name: &str) -> &str {
  name.split('_').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tracing_test::traced_test;

  #[test]
  fn write_mode_only_append_is_append() {
    assert_eq!(WriteMode::from("append"), WriteMode::Append);
    assert_eq!(WriteMode::from("overwrite"), WriteMode::Overwrite);
    assert_eq!(WriteMode::from("APPEND"), WriteMode::Overwrite);
    assert_eq!(WriteMode::from(""), WriteMode::Overwrite);
  }

  #[test]
  fn write_mode_redirect() {
    assert_eq!(WriteMode::Overwrite.redirect(), ">");
    assert_eq!(WriteMode::Append.redirect(), ">>");
  }

  #[test]
  fn patch_decodes_camel_case_yaml() {
    let yaml = r#"
output: /etc/foo.conf
mode: append
body: |
  line one
  line two
commandsAfter:
  - systemctl restart foo
commentCharacter: ";"
categories: [security, foo]
description: Tighten foo
"#;
    let patch: Patch = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(patch.output, "/etc/foo.conf");
    assert_eq!(patch.mode, WriteMode::Append);
    assert_eq!(patch.body, "line one\nline two\n");
    assert_eq!(patch.commands_after, vec!["systemctl restart foo"]);
    assert_eq!(patch.comment_character, ";");
    assert_eq!(patch.categories, vec!["security", "foo"]);
    assert_eq!(patch.description, "Tighten foo");
  }

  #[test]
  fn patch_defaults_missing_fields() {
    let patch: Patch = serde_yaml::from_str("output: /etc/motd").unwrap();

    assert_eq!(patch.mode, WriteMode::Overwrite);
    assert!(patch.body.is_empty());
    assert!(patch.commands_after.is_empty());
    assert!(patch.categories.is_empty());
  }

  #[test]
  #[traced_test]
  fn unknown_mode_decodes_as_overwrite() {
    let patch: Patch = serde_yaml::from_str("output: /etc/motd\nmode: prepend").unwrap();
    assert_eq!(patch.mode, WriteMode::Overwrite);
    assert!(logs_contain("unrecognized write mode"));
  }

  #[test]
  fn markers_use_comment_character() {
    let patch = Patch {
      comment_character: ";".to_string(),
      ..Default::default()
    };
    assert_eq!(patch.marker_start(), "; PATCHFILES START");
    assert_eq!(patch.marker_end(), "; PATCHFILES END");
  }

  #[test]
  fn named_patch_derives_short_name() {
    let named = NamedPatch::from_path(Path::new("patches/sshd_harden.yaml"), Patch::default());
    assert_eq!(named.name, "sshd_harden");
    assert_eq!(named.name_short, "sshd");
  }

  #[test]
  fn short_name_without_underscore_is_whole_name() {
    let named = NamedPatch::new("motd", "patches/motd.yaml", Patch::default());
    assert_eq!(named.name_short, "motd");
  }

  #[test]
  fn name_stops_at_first_dot() {
    assert_eq!(name_from_path(Path::new("/x/limits_nofile.v2.yml")), "limits_nofile");
  }
}
