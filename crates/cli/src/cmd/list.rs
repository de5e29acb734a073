//! List command: show the definitions a generate run would pick up.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use patchfiles_lib::definition::NamedPatch;
use patchfiles_lib::loader::load_dir;

use crate::output::{OutputFormat, format_list, print_error, print_info, print_json, print_stat, symbols};

#[derive(Serialize)]
struct ListError {
  file_loc: String,
  error: String,
}

#[derive(Serialize)]
struct ListOutput {
  patches: Vec<NamedPatch>,
  errors: Vec<ListError>,
}

/// Load every definition in `patches` and print it without generating anything.
///
/// Fails only when the directory itself cannot be read; per-file errors are
/// reported alongside the definitions.
pub fn cmd_list(patches: &Path, format: OutputFormat) -> Result<()> {
  let outcomes = load_dir(patches).with_context(|| format!("Failed to read patches from {}", patches.display()))?;

  let mut output = ListOutput {
    patches: Vec::new(),
    errors: Vec::new(),
  };
  for outcome in outcomes {
    match outcome {
      Ok(def) => output.patches.push(def),
      Err(e) => output.errors.push(ListError {
        file_loc: e.file_loc.display().to_string(),
        error: e.kind.to_string(),
      }),
    }
  }

  if format.is_json() {
    return print_json(&output);
  }

  if output.patches.is_empty() && output.errors.is_empty() {
    print_info(&format!("No patch definitions found in {}", patches.display()));
    return Ok(());
  }

  for def in &output.patches {
    println!(
      "{} ({} {} {})",
      def.name,
      def.patch.mode,
      symbols::ARROW,
      def.patch.output
    );
    print_stat("categories", &format_list(&def.patch.categories));
    if !def.patch.description.is_empty() {
      print_stat("description", def.patch.description.lines().next().unwrap_or_default());
    }
  }

  for err in &output.errors {
    print_error(&format!("{}: {}", err.file_loc, err.error));
  }

  Ok(())
}
