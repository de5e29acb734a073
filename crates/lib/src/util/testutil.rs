//! Test helpers for patchfiles-lib.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::GeneratorConfig;
use crate::definition::{NamedPatch, Patch, WriteMode};

/// Control file used by generator tests; never created by them.
pub const TEST_CONTROL_FILE: &str = "/tmp/patchfile-test";

/// Overwrite-mode definition in the `security` category.
pub fn overwrite_patch(name: &str, output: &str, body: &str) -> NamedPatch {
  NamedPatch::new(
    name,
    format!("patches/{}.yaml", name),
    Patch {
      output: output.to_string(),
      mode: WriteMode::Overwrite,
      body: body.to_string(),
      comment_character: "#".to_string(),
      categories: vec!["security".to_string()],
      description: format!("{} description", name),
      ..Default::default()
    },
  )
}

/// Append-mode definition in the `security` category.
pub fn append_patch(name: &str, output: &str, comment_character: &str, body: &str) -> NamedPatch {
  NamedPatch::new(
    name,
    format!("patches/{}.yaml", name),
    Patch {
      output: output.to_string(),
      mode: WriteMode::Append,
      body: body.to_string(),
      comment_character: comment_character.to_string(),
      categories: vec!["security".to_string()],
      description: format!("{} description", name),
      ..Default::default()
    },
  )
}

/// Generator config writing into `dir` with a harmless control file.
pub fn test_config(dir: &Path, environment: &str) -> GeneratorConfig {
  GeneratorConfig::default()
    .with_environment(environment)
    .with_output_dir(dir)
    .with_control_file(TEST_CONTROL_FILE)
}

/// Decode the first base64 payload (`echo '<payload>' | base64 -d`) in `script`.
pub fn decode_payload(script: &str) -> String {
  let start = script.find("echo '").expect("no payload in script") + "echo '".len();
  let len = script[start..].find("' | base64 -d").expect("unterminated payload");
  let bytes = STANDARD.decode(&script[start..start + len]).expect("payload is not base64");
  String::from_utf8(bytes).expect("payload is not UTF-8")
}
