use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use suspendwatch_cluster::{ClusterClient, ClusterError, Instance, TypeDefinition};
use suspendwatch_types::{ResourceReference, ResourceType};

/// In-memory cluster. Instances are shared by every version of a type, as
/// on a real API server.
#[derive(Default)]
pub struct FakeClusterClient {
    definitions: Vec<TypeDefinition>,
    instances: Mutex<BTreeMap<(String, String), Vec<Instance>>>,
    fail_discovery: bool,
    fail_list: bool,
    gets: Mutex<Vec<ResourceReference>>,
    lists: Mutex<Vec<ResourceType>>,
}

fn group_kind(resource_type: &ResourceType) -> (String, String) {
    (resource_type.group.clone(), resource_type.kind.clone())
}

impl FakeClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, definition: TypeDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Make `list_type_definitions` fail.
    pub fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    /// Make `list_instances` fail.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn with_instance(self, resource_type: &ResourceType, instance: Instance) -> Self {
        self.set_instance(resource_type, instance);
        self
    }

    /// Create or replace an instance.
    pub fn set_instance(&self, resource_type: &ResourceType, instance: Instance) {
        let mut instances = self.instances.lock();
        let list = instances.entry(group_kind(resource_type)).or_default();
        list.retain(|i| !(i.namespace == instance.namespace && i.name == instance.name));
        list.push(instance);
    }

    /// Set `spec.suspend` on an existing or new instance.
    pub fn set_suspend(&self, resource: &ResourceReference, suspend: bool) {
        self.set_instance(
            &resource.resource_type,
            Instance::new(&resource.namespace, &resource.name, suspend),
        );
    }

    pub fn remove_instance(&self, resource: &ResourceReference) {
        if let Some(list) = self.instances.lock().get_mut(&group_kind(&resource.resource_type)) {
            list.retain(|i| !(i.namespace == resource.namespace && i.name == resource.name));
        }
    }

    /// References passed to `get_instance`, in call order.
    pub fn gets(&self) -> Vec<ResourceReference> {
        self.gets.lock().clone()
    }

    /// Types passed to `list_instances`, in call order.
    pub fn lists(&self) -> Vec<ResourceType> {
        self.lists.lock().clone()
    }
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn list_type_definitions(
        &self,
        _label_selector: &str,
    ) -> Result<Vec<TypeDefinition>, ClusterError> {
        if self.fail_discovery {
            return Err(ClusterError::Config("discovery unavailable".to_string()));
        }
        Ok(self.definitions.clone())
    }

    async fn list_instances(
        &self,
        resource_type: &ResourceType,
    ) -> Result<Vec<Instance>, ClusterError> {
        self.lists.lock().push(resource_type.clone());
        if self.fail_list {
            return Err(ClusterError::Config(format!("cannot list {resource_type}")));
        }
        Ok(self
            .instances
            .lock()
            .get(&group_kind(resource_type))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_instance(&self, resource: &ResourceReference) -> Result<Instance, ClusterError> {
        self.gets.lock().push(resource.clone());
        self.instances
            .lock()
            .get(&group_kind(&resource.resource_type))
            .and_then(|list| {
                list.iter()
                    .find(|i| i.namespace == resource.namespace && i.name == resource.name)
                    .cloned()
            })
            .ok_or_else(|| ClusterError::NotFound(resource.to_path()))
    }
}
