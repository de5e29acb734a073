//! Script postamble: usage help and the control-file toggle.

use std::fmt::Write;

use super::header::FRAGMENTS_FN;
use super::shell::escape_double;
use super::types::{RunState, ScriptPurpose};

/// Values the footer needs beyond the run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterContext {
  pub control_file: String,
  /// File name of the generated patch script, used in the usage examples.
  pub patch_script: String,
  /// File name of the generated revert script, used in the usage examples.
  pub revert_script: String,
}

/// Render the footer shared by both scripts.
///
/// Closes the fragment function opened by the header, then lists every
/// category and patch name seen in the run. An empty or `help` category prints
/// the listing and exits successfully before any fragment runs; otherwise the
/// fragments run and the patch script marks the system as patched while the
/// revert script clears the mark.
pub fn render_footer(purpose: ScriptPurpose, state: &RunState, ctx: &FooterContext) -> String {
  let mut out = String::new();
  // Writing to a String cannot fail.
  let _ = write_footer(&mut out, purpose, state, ctx);
  out
}

fn write_footer(
  out: &mut String,
  purpose: ScriptPurpose,
  state: &RunState,
  ctx: &FooterContext,
) -> std::fmt::Result {
  writeln!(out, "}}")?;
  writeln!(out)?;
  writeln!(out, "function help_me() {{")?;
  writeln!(out, "  echo -e \"\\n\\n\"")?;
  writeln!(out, "  echo \"******************\"")?;
  writeln!(out, "  echo \"*** How to use ***\"")?;
  writeln!(out, "  echo \"******************\"")?;
  writeln!(out, "  echo -e \"\\n\"")?;
  writeln!(out, "  echo \"Available categories are:\"")?;
  for category in &state.categories {
    writeln!(out, "  echo \"* {}\"", escape_double(category))?;
  }
  writeln!(out, "  echo -e \"\\n\"")?;
  writeln!(out, "  echo \"Available patches are:\"")?;
  for name in &state.names {
    writeln!(out, "  echo \"* {}\"", escape_double(name))?;
  }
  writeln!(out, "  echo -e \"\\n\"")?;
  writeln!(out, "  echo \"Examples:\"")?;
  let patch = escape_double(&ctx.patch_script);
  let revert = escape_double(&ctx.revert_script);
  writeln!(out, "  echo \"./{} all\"", patch)?;
  writeln!(out, "  echo \"./{} security\"", patch)?;
  writeln!(out, "  echo \"./{} sshd\"", patch)?;
  writeln!(out, "  echo \"./{} sshd\"", revert)?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  writeln!(out, "if [[ \"$category\" == \"\" || \"$category\" == \"help\" ]]; then")?;
  writeln!(out, "  help_me")?;
  writeln!(out, "  exit 0")?;
  writeln!(out, "fi")?;
  writeln!(out)?;
  writeln!(out, "{}", FRAGMENTS_FN)?;
  writeln!(out)?;

  let control_file = escape_double(&ctx.control_file);
  match purpose {
    ScriptPurpose::Patching => writeln!(out, "echo 1 > \"{}\"", control_file)?,
    ScriptPurpose::Reverting => writeln!(out, "rm -f \"{}\"", control_file)?,
  }

  Ok(())
}
