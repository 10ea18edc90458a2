//! Configuration for suspendwatch.
//!
//! The watcher is configured by a single YAML file, located through the
//! `--config` flag or the `CONFIG_PATH` environment variable. Values may
//! reference environment variables as `${VAR}` or `${VAR:-default}`.

pub mod env;
pub mod loader;
pub mod types;

#[cfg(test)]
mod integration_test;

pub use env::*;
pub use loader::*;
pub use types::*;
