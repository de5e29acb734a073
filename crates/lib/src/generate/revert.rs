//! Revert fragment rendering.

use std::fmt::Write;

use crate::definition::{NamedPatch, WriteMode};

use super::category::CategorySelector;
use super::patch::{validate, write_comment_block};
use super::shell::{escape_double, escape_sed_pattern, escape_single};
use super::types::RenderError;

/// Render the fragment that undoes one definition.
///
/// Uses the same category selector as the patch fragment, followed by the
/// inverse of the write and the definition's post-commands.
pub fn render_revert(def: &NamedPatch) -> Result<String, RenderError> {
  validate(def)?;

  let selector = CategorySelector::for_patch(def);
  let mut out = String::new();

  write_comment_block(&mut out, def)?;
  writeln!(out)?;
  writeln!(out, "if {}; then", selector.condition())?;
  writeln!(out, "  echo -e \"\\n\\n\\n\"")?;
  writeln!(out, "  echo \"Reverting '{}'\"", escape_double(&def.name))?;
  writeln!(out, "  {}", revert_command(def))?;
  for command in def.patch.commands_after.iter().filter(|c| !c.trim().is_empty()) {
    writeln!(out, "  {}", command)?;
  }
  writeln!(out, "fi")?;

  Ok(out)
}

/// The inverse of the patch write.
///
/// Overwrite restores the backup, which also clears the patch skip-guard.
/// Append deletes the inclusive marker range and leaves the rest of the file alone.
pub fn revert_command(def: &NamedPatch) -> String {
  let patch = &def.patch;
  match patch.mode {
    WriteMode::Overwrite => format!("mv {} {}", patch.backup_path(), patch.output),
    WriteMode::Append => {
      let start = escape_single(&escape_sed_pattern(&patch.marker_start()));
      let end = escape_single(&escape_sed_pattern(&patch.marker_end()));
      format!("sed -i -e '/{}/,/{}/d' {}", start, end, patch.output)
    }
  }
}
