//! Patch fragment rendering.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use crate::definition::{NamedPatch, WriteMode};

use super::category::CategorySelector;
use super::shell::{comment_lines, escape_double, escape_single};
use super::types::RenderError;

const BODY_PREFIX: &str = "#    ";

/// Render the fragment that applies one definition.
///
/// The fragment runs only for a matching category, and skips itself with a
/// warning when the target already shows signs of a previous application:
/// the start marker for append mode, the backup file for overwrite mode.
pub fn render_patch(def: &NamedPatch) -> Result<String, RenderError> {
  validate(def)?;

  let patch = &def.patch;
  if patch.mode == WriteMode::Append && patch.comment_character.trim().is_empty() {
    warn!(
      name = %def.name,
      marker = %patch.marker_start(),
      "append patch has no comment character, markers will be bare"
    );
  }

  let selector = CategorySelector::for_patch(def);
  let mut out = String::new();

  write_comment_block(&mut out, def)?;
  writeln!(out, "# body:")?;
  writeln!(out, "{}", comment_lines(&patch.body, BODY_PREFIX))?;
  writeln!(out, "#")?;
  writeln!(out)?;

  writeln!(out, "if {}; then", selector.condition())?;
  writeln!(out, "  echo -e \"\\n\\n\\n\"")?;
  writeln!(out, "  echo \"Patching '{}'\"", escape_double(&def.name))?;

  match patch.mode {
    WriteMode::Append => {
      writeln!(
        out,
        "  if grep -qsF -- '{}' {}; then",
        escape_single(&patch.marker_start()),
        patch.output
      )?;
      writeln!(
        out,
        "    echo \"WARNING: '{}' is already applied to {}. Run the revert script first or remove the PATCHFILES markers manually. Skipping.\" >&2",
        escape_double(&def.name),
        escape_double(&patch.output)
      )?;
    }
    WriteMode::Overwrite => {
      writeln!(out, "  if test -e {}; then", patch.backup_path())?;
      writeln!(
        out,
        "    echo \"WARNING: backup {} already exists, '{}' looks applied. Run the revert script first or remove the backup manually. Skipping.\" >&2",
        escape_double(&patch.backup_path()),
        escape_double(&def.name)
      )?;
    }
  }

  writeln!(out, "  else")?;
  if let Some(backup) = backup_command(def) {
    writeln!(out, "    {}", backup)?;
  }
  writeln!(
    out,
    "    echo '{}' | base64 -d - {} {}",
    payload(def),
    patch.mode.redirect(),
    patch.output
  )?;
  for command in patch.commands_after.iter().filter(|c| !c.trim().is_empty()) {
    writeln!(out, "    {}", command)?;
  }
  writeln!(out, "  fi")?;
  writeln!(out, "fi")?;

  Ok(out)
}

/// The text actually written to the target: the body, wrapped in start/end
/// markers for append mode.
pub fn wrapped_body(def: &NamedPatch) -> String {
  let patch = &def.patch;
  match patch.mode {
    WriteMode::Append => format!(
      "\n{}\n{}\n{}\n",
      patch.marker_start(),
      patch.body,
      patch.marker_end()
    ),
    WriteMode::Overwrite => patch.body.clone(),
  }
}

/// Base64 of the wrapped body plus a trailing newline.
pub fn payload(def: &NamedPatch) -> String {
  STANDARD.encode(format!("{}\n", wrapped_body(def)))
}

/// Copy of the target taken before an overwrite, so revert can restore it.
pub fn backup_command(def: &NamedPatch) -> Option<String> {
  match def.patch.mode {
    WriteMode::Overwrite => Some(format!("cp -r {} {}", def.patch.output, def.patch.backup_path())),
    WriteMode::Append => None,
  }
}

/// Reject definitions that cannot produce a working fragment.
pub(super) fn validate(def: &NamedPatch) -> Result<(), RenderError> {
  let patch = &def.patch;
  if patch.output.trim().is_empty() {
    return Err(RenderError::MissingOutput { name: def.name.clone() });
  }
  if patch.output.contains(['\n', '\r', '\0']) {
    return Err(RenderError::InvalidOutput {
      name: def.name.clone(),
      output: patch.output.clone(),
    });
  }
  Ok(())
}

/// Comment block shared by patch and revert fragments.
pub(super) fn write_comment_block(out: &mut String, def: &NamedPatch) -> Result<(), RenderError> {
  writeln!(out)?;
  writeln!(out, "#")?;
  writeln!(out, "# PATCH '{}'", def.name.replace('\n', " "))?;
  writeln!(out, "#")?;
  writeln!(out, "# categories: {}", def.patch.categories.join(", ").replace('\n', " "))?;
  writeln!(out, "#")?;
  writeln!(out, "# description:")?;
  writeln!(out, "{}", comment_lines(&def.patch.description, BODY_PREFIX))?;
  writeln!(out, "#")?;
  Ok(())
}
