//! Resource identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of `/`-separated segments in an audit resource path.
const PATH_SEGMENTS: usize = 6;

/// Identity parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("unexpected path format: {path}")]
    MalformedPath { path: String },
}

/// A class of cluster resource.
///
/// `kind` is the plural resource name (`helmreleases`), which is what both
/// API paths and audit log resource names carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceType {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl ResourceType {
    /// Create a resource type.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// `group/version`, as used in `apiVersion`.
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    /// Key identifying the type independently of its version.
    pub fn group_kind(&self) -> (&str, &str) {
        (&self.group, &self.kind)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.kind, self.group, self.version)
    }
}

/// A single resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub namespace: String,
    pub name: String,
}

impl ResourceReference {
    /// Create a reference.
    pub fn new(
        resource_type: ResourceType,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse an audit log resource name of the form
    /// `<group>/<version>/namespaces/<namespace>/<kind>/<name>`.
    pub fn from_path(path: &str) -> Result<Self, IdentityError> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != PATH_SEGMENTS {
            return Err(IdentityError::MalformedPath {
                path: path.to_string(),
            });
        }

        Ok(Self {
            resource_type: ResourceType::new(parts[0], parts[1], parts[4]),
            namespace: parts[3].to_string(),
            name: parts[5].to_string(),
        })
    }

    /// Render back to the audit path form accepted by [`Self::from_path`].
    pub fn to_path(&self) -> String {
        format!(
            "{}/{}/namespaces/{}/{}/{}",
            self.resource_type.group,
            self.resource_type.version,
            self.namespace,
            self.resource_type.kind,
            self.name
        )
    }

    /// Deterministic state store key.
    ///
    /// The version is left out so every served version of an object maps to
    /// the same entry.
    pub fn store_key(&self) -> String {
        format!(
            "resource:{}:{}:{}:{}",
            self.resource_type.group, self.resource_type.kind, self.namespace, self.name
        )
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

impl FromStr for ResourceReference {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_path(s)
    }
}
