//! patchfiles-lib: generation of paired patch/revert shell scripts.
//!
//! Patch definitions are small YAML documents describing one file change.
//! This crate turns a directory of them into two bash scripts:
//! - `patch.sh` applies every change, guarded by category and by idempotency checks
//! - `revert.sh` undoes them, restoring backups or deleting marker blocks
//!
//! Modules:
//! - `definition`: the `Patch` / `NamedPatch` data model
//! - `loader`: directory discovery and YAML decoding
//! - `generate`: fragment renderers and the `Generator` that owns both scripts
//! - `pipeline`: loader/generator hand-off with timeout and interrupt handling
//! - `config`: environment-driven generator settings

pub mod config;
pub mod consts;
pub mod definition;
pub mod generate;
pub mod loader;
pub mod pipeline;
#[cfg(test)]
pub(crate) mod util;
