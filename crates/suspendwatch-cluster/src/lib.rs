//! Cluster access.
//!
//! The watcher only needs three reads from the API server: which Flux types
//! exist (and which of their versions carry `spec.suspend`), every instance
//! of a type, and one instance by name. [`ClusterClient`] is that seam;
//! [`KubeClusterClient`] implements it on top of `kube`.

mod kube_client;
mod schema;

pub use kube_client::{ClientSource, KubeClusterClient};
pub use schema::{definition_from_crd, suspend_flag, version_is_suspendable};

use async_trait::async_trait;
use suspendwatch_types::{ResourceReference, ResourceType};
use thiserror::Error;

/// Cluster access errors.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("kubernetes client configuration error: {0}")]
    Config(String),
}

impl ClusterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// One served version of a custom resource definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSchema {
    pub name: String,
    /// Whether the version's schema declares `spec.suspend`.
    pub suspendable: bool,
}

/// A custom resource definition reduced to what type discovery needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub group: String,
    /// Plural resource name, e.g. `helmreleases`.
    pub plural: String,
    pub versions: Vec<VersionSchema>,
}

impl TypeDefinition {
    /// Resource types for every version that carries `spec.suspend`.
    pub fn suspendable_types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.versions
            .iter()
            .filter(|v| v.suspendable)
            .map(|v| ResourceType::new(&self.group, &v.name, &self.plural))
    }
}

/// A resource instance as seen by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub namespace: String,
    pub name: String,
    /// Current `spec.suspend`; absent counts as `false`.
    pub suspend: bool,
}

impl Instance {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, suspend: bool) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            suspend,
        }
    }

    /// Reference to this instance under `resource_type`.
    pub fn reference(&self, resource_type: &ResourceType) -> ResourceReference {
        ResourceReference::new(resource_type.clone(), &self.namespace, &self.name)
    }
}

/// Read-only view of the cluster.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Custom resource definitions matching `label_selector`.
    async fn list_type_definitions(
        &self,
        label_selector: &str,
    ) -> Result<Vec<TypeDefinition>, ClusterError>;

    /// All instances of a type across namespaces.
    async fn list_instances(&self, resource_type: &ResourceType)
        -> Result<Vec<Instance>, ClusterError>;

    /// A single instance. Fails with [`ClusterError::NotFound`] when it does not exist.
    async fn get_instance(&self, resource: &ResourceReference) -> Result<Instance, ClusterError>;
}
