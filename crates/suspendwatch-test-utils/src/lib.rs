//! Test utilities for suspendwatch crates.

mod cluster;
mod notifier;
mod store;
mod transport;

pub use cluster::FakeClusterClient;
pub use notifier::RecordingNotifier;
pub use store::CountingStore;
pub use transport::{audit_log_entry, ScriptedTransport, Session};

use suspendwatch_cluster::{TypeDefinition, VersionSchema};
use suspendwatch_types::{ResourceReference, ResourceType};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// `helm.toolkit.fluxcd.io/v2` HelmRelease type.
pub fn helm_release_type() -> ResourceType {
    ResourceType::new("helm.toolkit.fluxcd.io", "v2", "helmreleases")
}

/// `kustomize.toolkit.fluxcd.io/v1` Kustomization type.
pub fn kustomization_type() -> ResourceType {
    ResourceType::new("kustomize.toolkit.fluxcd.io", "v1", "kustomizations")
}

pub fn helm_release(namespace: &str, name: &str) -> ResourceReference {
    ResourceReference::new(helm_release_type(), namespace, name)
}

/// A definition whose listed versions all carry `spec.suspend`.
pub fn suspendable_definition(group: &str, plural: &str, versions: &[&str]) -> TypeDefinition {
    TypeDefinition {
        group: group.to_string(),
        plural: plural.to_string(),
        versions: versions
            .iter()
            .map(|v| VersionSchema {
                name: v.to_string(),
                suspendable: true,
            })
            .collect(),
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
