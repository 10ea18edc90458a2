//! Suspend flag reconciliation.
//!
//! [`Watcher`] discovers which Flux resource types can be suspended, records
//! a baseline for every existing instance, then follows the audit log and
//! notifies whenever an instance's `spec.suspend` differs from the last value
//! it stored.

mod error;
mod watcher;

pub use error::WatchError;
pub use watcher::{Observation, Outcome, TrackedTypes, Watcher, DEFAULT_LABEL_SELECTOR};
