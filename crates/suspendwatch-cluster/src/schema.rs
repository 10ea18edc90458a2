//! CRD schema inspection.

use crate::{TypeDefinition, VersionSchema};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, CustomResourceDefinitionVersion,
};
use serde_json::Value;

/// Whether a CRD version's OpenAPI schema declares `spec.suspend`.
///
/// Versions without a structural schema are treated as not suspendable.
pub fn version_is_suspendable(version: &CustomResourceDefinitionVersion) -> bool {
    version
        .schema
        .as_ref()
        .and_then(|s| s.open_api_v3_schema.as_ref())
        .and_then(|root| root.properties.as_ref())
        .and_then(|props| props.get("spec"))
        .and_then(|spec| spec.properties.as_ref())
        .is_some_and(|props| props.contains_key("suspend"))
}

/// Only versions the API server serves are kept; listing any other fails.
pub fn definition_from_crd(crd: &CustomResourceDefinition) -> TypeDefinition {
    TypeDefinition {
        group: crd.spec.group.clone(),
        plural: crd.spec.names.plural.clone(),
        versions: crd
            .spec
            .versions
            .iter()
            .filter(|v| v.served)
            .map(|v| VersionSchema {
                name: v.name.clone(),
                suspendable: version_is_suspendable(v),
            })
            .collect(),
    }
}

/// Read `spec.suspend` from an object's body; anything but `true` is `false`.
pub fn suspend_flag(data: &Value) -> bool {
    data.pointer("/spec/suspend")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn crd() -> CustomResourceDefinition {
        serde_json::from_value(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "CustomResourceDefinition",
            "metadata": {
                "name": "kustomizations.kustomize.toolkit.fluxcd.io",
                "labels": {"app.kubernetes.io/part-of": "flux"}
            },
            "spec": {
                "group": "kustomize.toolkit.fluxcd.io",
                "names": {"kind": "Kustomization", "plural": "kustomizations"},
                "scope": "Namespaced",
                "versions": [
                    {
                        "name": "v1",
                        "served": true,
                        "storage": true,
                        "schema": {"openAPIV3Schema": {
                            "type": "object",
                            "properties": {"spec": {
                                "type": "object",
                                "properties": {
                                    "suspend": {"type": "boolean"},
                                    "interval": {"type": "string"}
                                }
                            }}
                        }}
                    },
                    {
                        "name": "v1beta1",
                        "served": true,
                        "storage": false,
                        "schema": {"openAPIV3Schema": {
                            "type": "object",
                            "properties": {"spec": {
                                "type": "object",
                                "properties": {"interval": {"type": "string"}}
                            }}
                        }}
                    },
                    {
                        "name": "v1alpha1",
                        "served": false,
                        "storage": false,
                        "schema": {"openAPIV3Schema": {
                            "type": "object",
                            "properties": {"spec": {
                                "type": "object",
                                "properties": {"suspend": {"type": "boolean"}}
                            }}
                        }}
                    }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_definition_from_crd() {
        let definition = definition_from_crd(&crd());
        assert_eq!(definition.group, "kustomize.toolkit.fluxcd.io");
        assert_eq!(definition.plural, "kustomizations");

        let flags: Vec<_> = definition
            .versions
            .iter()
            .map(|v| (v.name.as_str(), v.suspendable))
            .collect();
        assert_eq!(flags, vec![("v1", true), ("v1beta1", false)]);
    }

    #[test]
    fn test_unserved_version_is_never_tracked() {
        let types: Vec<_> = definition_from_crd(&crd())
            .suspendable_types()
            .map(|t| t.version)
            .collect();
        assert_eq!(types, vec!["v1".to_string()]);
    }

    #[test]
    fn test_suspend_flag() {
        assert!(suspend_flag(&json!({"spec": {"suspend": true}})));
        assert!(!suspend_flag(&json!({"spec": {"suspend": false}})));
        assert!(!suspend_flag(&json!({"spec": {}})));
        assert!(!suspend_flag(&json!({"spec": {"suspend": "yes"}})));
        assert!(!suspend_flag(&json!({})));
    }
}
