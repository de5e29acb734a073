//! Generator configuration.
//!
//! Values come from the environment and may be overridden by the caller:
//! - `ENVIRONMENT`: target environment name, defaults to `dev`
//! - `AUTHOR`, `VERSION`: free text embedded in the script headers
//! - `PATCHFILES_CONTROL_FILE`: sentinel path, defaults to `/patchfile`
//!
//! All values are trimmed; environment, author and version are lower-cased.

use std::path::PathBuf;

use crate::consts::{DEFAULT_CONTROL_FILE, DEFAULT_ENVIRONMENT};
use crate::generate::ScriptPurpose;

pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_AUTHOR: &str = "AUTHOR";
pub const ENV_VERSION: &str = "VERSION";
pub const ENV_CONTROL_FILE: &str = "PATCHFILES_CONTROL_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
  pub environment: String,
  pub author: String,
  pub version: String,
  /// Directory the two scripts are written to.
  pub output_dir: PathBuf,
  /// Sentinel path the generated scripts create and remove.
  pub control_file: String,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      environment: DEFAULT_ENVIRONMENT.to_string(),
      author: String::new(),
      version: String::new(),
      output_dir: PathBuf::from("."),
      control_file: DEFAULT_CONTROL_FILE.to_string(),
    }
  }
}

impl GeneratorConfig {
  /// Read configuration from the process environment.
  pub fn from_env() -> Self {
    let environment = normalize(&env_or_empty(ENV_ENVIRONMENT));
    let control_file = env_or_empty(ENV_CONTROL_FILE).trim().to_string();

    Self {
      environment: if environment.is_empty() {
        DEFAULT_ENVIRONMENT.to_string()
      } else {
        environment
      },
      author: normalize(&env_or_empty(ENV_AUTHOR)),
      version: normalize(&env_or_empty(ENV_VERSION)),
      output_dir: PathBuf::from("."),
      control_file: if control_file.is_empty() {
        DEFAULT_CONTROL_FILE.to_string()
      } else {
        control_file
      },
    }
  }

  /// Override the environment name, applying the same normalization as `from_env`.
  pub fn with_environment(mut self, environment: &str) -> Self {
    let environment = normalize(environment);
    if !environment.is_empty() {
      self.environment = environment;
    }
    self
  }

  pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
    self.output_dir = output_dir.into();
    self
  }

  pub fn with_control_file(mut self, control_file: impl Into<String>) -> Self {
    self.control_file = control_file.into();
    self
  }

  /// Full path of the script generated for `purpose`.
  pub fn script_path(&self, purpose: ScriptPurpose) -> PathBuf {
    self.output_dir.join(purpose.file_name(&self.environment))
  }
}

fn env_or_empty(key: &str) -> String {
  std::env::var(key).unwrap_or_default()
}

fn normalize(value: &str) -> String {
  value.trim().to_lowercase()
}
