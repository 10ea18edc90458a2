use crate::WatchError;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use suspendwatch_auditlog::{AuditEntry, TailError, Tailer};
use suspendwatch_cluster::ClusterClient;
use suspendwatch_notify::Notifier;
use suspendwatch_store::StateStore;
use suspendwatch_types::{ChangeEvent, ResourceReference, ResourceType, StateEntry, UNKNOWN_PRINCIPAL};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub use suspendwatch_types::DEFAULT_LABEL_SELECTOR;

/// Resource types whose schema carries `spec.suspend`, one per served version.
pub type TrackedTypes = BTreeSet<ResourceType>;

/// Where an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Listing instances at startup. Never notifies.
    Bootstrap,
    /// Following an audit log entry.
    Live,
}

/// Result of reconciling one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First sighting; state recorded.
    Baseline,
    /// Matches stored state; nothing written.
    Unchanged,
    /// Differed at bootstrap; state replaced without notifying.
    Rebaselined,
    /// Differed on a live observation; state replaced and notified.
    Notified,
}

/// Tracks Flux suspend flags and reports flips.
pub struct Watcher {
    cluster: Arc<dyn ClusterClient>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    tailer: Tailer,
    label_selector: String,
}

impl Watcher {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        tailer: Tailer,
    ) -> Self {
        Self {
            cluster,
            store,
            notifier,
            tailer,
            label_selector: DEFAULT_LABEL_SELECTOR.to_string(),
        }
    }

    /// Label selector used to find Flux CRDs.
    pub fn with_label_selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = selector.into();
        self
    }

    fn cluster_context_id(&self) -> &str {
        self.tailer.filter().project_id()
    }

    /// Discover types, bootstrap, then follow the audit log until cancelled.
    pub async fn watch(&self, cancel: &CancellationToken) -> Result<(), WatchError> {
        let tracked = self.resolve_types().await?;
        if cancel.is_cancelled() {
            return Ok(());
        }

        self.bootstrap(&tracked).await?;
        if cancel.is_cancelled() {
            return Ok(());
        }

        info!("watching audit logs for suspend changes");
        let tracked = &tracked;
        let result = self
            .tailer
            .tail(cancel, move |entry| self.handle_entry(tracked, entry))
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TailError::Handler(err)) => match err.downcast::<WatchError>() {
                Ok(err) => Err(*err),
                Err(other) => Err(TailError::Handler(other).into()),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Every (group, version, plural) served by a Flux CRD whose schema has
    /// `spec.suspend`.
    #[instrument(skip(self), fields(selector = %self.label_selector))]
    pub async fn resolve_types(&self) -> Result<TrackedTypes, WatchError> {
        let definitions = self
            .cluster
            .list_type_definitions(&self.label_selector)
            .await
            .map_err(WatchError::Discovery)?;

        let tracked: TrackedTypes = definitions
            .iter()
            .flat_map(|d| d.suspendable_types())
            .collect();

        for resource_type in &tracked {
            debug!(%resource_type, "tracking resource type");
        }
        info!(
            definitions = definitions.len(),
            types = tracked.len(),
            "resolved suspendable resource types"
        );
        Ok(tracked)
    }

    /// Record state for every existing instance without notifying. Each
    /// (group, kind) is listed once whatever the number of versions.
    pub async fn bootstrap(&self, tracked: &TrackedTypes) -> Result<(), WatchError> {
        let mut listed = HashSet::new();

        for resource_type in tracked {
            if !listed.insert(resource_type.group_kind()) {
                continue;
            }

            let instances = self
                .cluster
                .list_instances(resource_type)
                .await
                .map_err(|source| WatchError::Bootstrap {
                    resource_type: resource_type.clone(),
                    source,
                })?;

            debug!(%resource_type, count = instances.len(), "bootstrapping instances");
            for instance in instances {
                self.reconcile(
                    instance.reference(resource_type),
                    instance.suspend,
                    UNKNOWN_PRINCIPAL,
                    Observation::Bootstrap,
                )
                .await?;
            }
        }

        info!(kinds = listed.len(), "bootstrap complete");
        Ok(())
    }

    /// Process one audit entry.
    pub async fn handle_entry(
        &self,
        tracked: &TrackedTypes,
        entry: AuditEntry,
    ) -> Result<(), WatchError> {
        if entry.status_code != 0 {
            warn!(
                resource = %entry.resource_name,
                code = entry.status_code,
                message = %entry.status_message,
                "skipping failed operation"
            );
            return Ok(());
        }

        let resource = ResourceReference::from_path(&entry.resource_name)?;

        if !tracked.contains(&resource.resource_type) {
            info!(%resource, "skipping untracked resource type");
            return Ok(());
        }

        let instance = match self.cluster.get_instance(&resource).await {
            Ok(instance) => instance,
            Err(err) if err.is_not_found() => {
                info!(%resource, "resource no longer exists, skipping");
                return Ok(());
            }
            Err(err) => return Err(WatchError::Cluster(err)),
        };

        self.reconcile(
            resource,
            instance.suspend,
            &entry.principal_email,
            Observation::Live,
        )
        .await?;
        Ok(())
    }

    /// Compare an observation with stored state, persist any difference and,
    /// for live observations, notify after persisting.
    pub async fn reconcile(
        &self,
        resource: ResourceReference,
        suspended: bool,
        actor: &str,
        observation: Observation,
    ) -> Result<Outcome, WatchError> {
        let mut entry = match self.store.get(&resource).await {
            Ok(entry) => entry,
            Err(err) if err.is_not_found() => {
                let entry = StateEntry::new(resource, suspended, actor);
                self.store.put(&entry).await?;
                info!(resource = %entry.resource, suspended, "recorded baseline state");
                return Ok(Outcome::Baseline);
            }
            Err(err) => return Err(err.into()),
        };

        if entry.suspended == suspended {
            debug!(%resource, suspended, "state unchanged");
            return Ok(Outcome::Unchanged);
        }

        entry.record(resource, suspended, actor);
        self.store.put(&entry).await?;

        if observation == Observation::Bootstrap {
            info!(resource = %entry.resource, suspended, "state changed while offline, re-baselined");
            return Ok(Outcome::Rebaselined);
        }

        let event = ChangeEvent {
            resource: entry.resource,
            suspended,
            acting_principal: actor.to_string(),
            cluster_context_id: self.cluster_context_id().to_string(),
        };
        info!(
            resource = %event.resource,
            principal = %event.acting_principal,
            suspended,
            "suspend state changed"
        );
        self.notifier.notify(&event).await?;
        Ok(Outcome::Notified)
    }
}
