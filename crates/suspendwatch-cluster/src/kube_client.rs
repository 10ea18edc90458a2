use crate::schema::{definition_from_crd, suspend_flag};
use crate::{ClusterClient, ClusterError, Instance, TypeDefinition};
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::discovery::ApiResource;
use kube::{Client, Config};
use std::path::PathBuf;
use suspendwatch_types::{ResourceReference, ResourceType};
use tracing::{debug, info, instrument};

/// Where to take cluster credentials from.
#[derive(Debug, Clone, Default)]
pub enum ClientSource {
    /// In-cluster service account, then `KUBECONFIG` / `~/.kube/config`.
    #[default]
    Infer,
    /// An explicit kubeconfig file.
    Kubeconfig(PathBuf),
}

/// [`ClusterClient`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the given credential source.
    pub async fn connect(source: &ClientSource) -> Result<Self, ClusterError> {
        let config = match source {
            ClientSource::Infer => Config::infer()
                .await
                .map_err(|e| ClusterError::Config(e.to_string()))?,
            ClientSource::Kubeconfig(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    ClusterError::Config(format!("{}: {e}", path.display()))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| ClusterError::Config(e.to_string()))?
            }
        };

        info!(cluster_url = %config.cluster_url, "connecting to kubernetes");
        let client = Client::try_from(config)?;
        Ok(Self::new(client))
    }

    fn dynamic_api(&self, resource_type: &ResourceType) -> Api<DynamicObject> {
        Api::all_with(self.client.clone(), &api_resource(resource_type))
    }
}

/// Only the URL-forming fields matter for reads, so the plural stands in for
/// the CamelCase kind.
fn api_resource(resource_type: &ResourceType) -> ApiResource {
    ApiResource {
        group: resource_type.group.clone(),
        version: resource_type.version.clone(),
        api_version: resource_type.api_version(),
        kind: resource_type.kind.clone(),
        plural: resource_type.kind.clone(),
    }
}

fn to_instance(object: &DynamicObject) -> Instance {
    Instance::new(
        object.metadata.namespace.clone().unwrap_or_default(),
        object.metadata.name.clone().unwrap_or_default(),
        suspend_flag(&object.data),
    )
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    #[instrument(skip(self))]
    async fn list_type_definitions(
        &self,
        label_selector: &str,
    ) -> Result<Vec<TypeDefinition>, ClusterError> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let crds = api
            .list(&ListParams::default().labels(label_selector))
            .await?;

        debug!(count = crds.items.len(), "listed custom resource definitions");
        Ok(crds.items.iter().map(definition_from_crd).collect())
    }

    #[instrument(skip(self), fields(resource_type = %resource_type))]
    async fn list_instances(
        &self,
        resource_type: &ResourceType,
    ) -> Result<Vec<Instance>, ClusterError> {
        let objects = self
            .dynamic_api(resource_type)
            .list(&ListParams::default())
            .await?;
        Ok(objects.items.iter().map(to_instance).collect())
    }

    async fn get_instance(&self, resource: &ResourceReference) -> Result<Instance, ClusterError> {
        let api: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            &resource.namespace,
            &api_resource(&resource.resource_type),
        );

        match api.get(&resource.name).await {
            Ok(object) => Ok(to_instance(&object)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                Err(ClusterError::NotFound(resource.to_path()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
