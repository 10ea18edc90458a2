use suspendwatch_auditlog::TailError;
use suspendwatch_cluster::ClusterError;
use suspendwatch_notify::NotifyError;
use suspendwatch_store::StoreError;
use suspendwatch_types::{IdentityError, ResourceType};
use thiserror::Error;

/// Errors that end [`crate::Watcher::watch`].
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to discover resource types: {0}")]
    Discovery(#[source] ClusterError),

    #[error("failed to list {resource_type} during bootstrap: {source}")]
    Bootstrap {
        resource_type: ResourceType,
        #[source]
        source: ClusterError,
    },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("failed to fetch resource: {0}")]
    Cluster(#[source] ClusterError),

    #[error("state store failure: {0}")]
    Store(#[from] StoreError),

    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Tail(#[from] TailError),
}
