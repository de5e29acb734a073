//! Script preamble: shebang, metadata block, argument capture and control-file guard.

use super::shell::escape_double;
use super::types::{ScriptMetadata, ScriptPurpose};

/// Bash function holding every fragment of a script.
pub const FRAGMENTS_FN: &str = "run_fragments";

/// Render the header shared by both scripts.
///
/// The patch script exits early when the control file exists; the revert
/// script exits early when it does not. Both exits are successful.
///
/// The header ends by opening [`FRAGMENTS_FN`]; fragments land in its body and
/// the footer closes it, so no fragment runs before the usage check.
pub fn render_header(purpose: ScriptPurpose, meta: &ScriptMetadata) -> String {
  let control_file = escape_double(&meta.control_file);
  let guard = match purpose {
    ScriptPurpose::Patching => format!(
      "if test -f \"{}\"; then\n  echo \"System already patched. Exiting.\"\n  exit 0\nfi\n",
      control_file
    ),
    ScriptPurpose::Reverting => format!(
      "if test ! -f \"{}\"; then\n  echo \"System is not patched. Exiting.\"\n  exit 0\nfi\n",
      control_file
    ),
  };

  format!(
    r#"#!/usr/bin/env bash
#
# PATCHFILES SCRIPT FOR {purpose}
#
# author: {author}
# version: {version}
# environment: {environment}
# built: {built}
#

args=("$@")
category="${{args[0]}}"

{guard}
function {fragments}() {{
  :
"#,
    purpose = purpose,
    author = single_line(&meta.author),
    version = single_line(&meta.version),
    environment = single_line(&meta.environment),
    built = single_line(&meta.built),
    guard = guard,
    fragments = FRAGMENTS_FN,
  )
}

// Metadata lands in comments; a newline would end the comment.
fn single_line(value: &str) -> String {
  value.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn meta() -> ScriptMetadata {
    ScriptMetadata {
      environment: "prod".to_string(),
      author: "ops team".to_string(),
      version: "1.2.0".to_string(),
      built: "2026-10-19 08:00:00 +00:00".to_string(),
      control_file: "/patchfile".to_string(),
    }
  }

  #[test]
  fn header_starts_with_shebang_and_metadata() {
    let header = render_header(ScriptPurpose::Patching, &meta());

    assert!(header.starts_with("#!/usr/bin/env bash\n"));
    assert!(header.contains("# PATCHFILES SCRIPT FOR PATCHING\n"));
    assert!(header.contains("# author: ops team\n"));
    assert!(header.contains("# version: 1.2.0\n"));
    assert!(header.contains("# environment: prod\n"));
    assert!(header.contains("# built: 2026-10-19 08:00:00 +00:00\n"));
  }

  #[test]
  fn header_captures_category_argument() {
    let header = render_header(ScriptPurpose::Reverting, &meta());

    assert!(header.contains("args=(\"$@\")\n"));
    assert!(header.contains("category=\"${args[0]}\"\n"));
  }

  #[test]
  fn patching_guard_exits_when_control_file_exists() {
    let header = render_header(ScriptPurpose::Patching, &meta());

    assert!(header.contains("if test -f \"/patchfile\"; then"));
    assert!(header.contains("System already patched. Exiting."));
    assert!(header.contains("exit 0"));
    assert!(!header.contains("test ! -f"));
  }

  #[test]
  fn reverting_guard_exits_when_control_file_missing() {
    let header = render_header(ScriptPurpose::Reverting, &meta());

    assert!(header.contains("# PATCHFILES SCRIPT FOR REVERTING\n"));
    assert!(header.contains("if test ! -f \"/patchfile\"; then"));
    assert!(header.contains("System is not patched. Exiting."));
  }

  #[test]
  fn header_opens_fragment_function_after_guard() {
    let header = render_header(ScriptPurpose::Patching, &meta());

    let guard = header.find("System already patched").unwrap();
    let function = header.find("function run_fragments() {\n  :\n").unwrap();
    assert!(guard < function);
    assert!(header.ends_with("function run_fragments() {\n  :\n"));
  }

  #[test]
  fn metadata_newlines_cannot_escape_comment() {
    let mut meta = meta();
    meta.author = "evil\nrm -rf /".to_string();

    let header = render_header(ScriptPurpose::Patching, &meta);

    assert!(header.contains("# author: evil rm -rf /\n"));
  }
}
