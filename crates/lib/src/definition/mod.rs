//! Patch definitions.
//!
//! A definition describes one file modification: the target path, the content
//! to install, how to write it, and the commands to run afterwards. Definitions
//! are decoded from YAML by the [`loader`](crate::loader) and consumed by the
//! [`generate`](crate::generate) module.

mod types;

pub use types::*;
