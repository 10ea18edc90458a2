//! Tail filter construction.

use crate::transport::TailRequest;

pub use suspendwatch_types::{DEFAULT_EXCLUDED_PRINCIPAL_PATTERN, DEFAULT_METHOD_PATTERN};

/// What the tailer subscribes to: write operations on Flux resources in one
/// cluster, minus Flux's own controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailFilter {
    project_id: String,
    cluster_name: String,
    method_pattern: String,
    excluded_principal_pattern: String,
}

impl TailFilter {
    pub fn new(project_id: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            cluster_name: cluster_name.into(),
            method_pattern: DEFAULT_METHOD_PATTERN.to_string(),
            excluded_principal_pattern: DEFAULT_EXCLUDED_PRINCIPAL_PATTERN.to_string(),
        }
    }

    pub fn method_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.method_pattern = pattern.into();
        self
    }

    pub fn excluded_principal_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.excluded_principal_pattern = pattern.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The Logging query language expression.
    pub fn expression(&self) -> String {
        [
            r#"resource.type="k8s_cluster""#.to_string(),
            format!(
                r#"log_name="projects/{}/logs/cloudaudit.googleapis.com%2Factivity""#,
                self.project_id
            ),
            format!(r#"resource.labels.cluster_name="{}""#, self.cluster_name),
            r#"protoPayload."@type"="type.googleapis.com/google.cloud.audit.AuditLog""#.to_string(),
            format!(r#"protoPayload.methodName=~"{}""#, self.method_pattern),
            format!(
                r#"-protoPayload.authenticationInfo.principalEmail=~"{}""#,
                self.excluded_principal_pattern
            ),
        ]
        .join(" AND ")
    }

    /// The request every session is opened with.
    pub fn request(&self) -> TailRequest {
        TailRequest {
            resource_names: vec![format!("projects/{}", self.project_id)],
            filter: self.expression(),
        }
    }
}
