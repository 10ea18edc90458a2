//! Change notifications.

use crate::ResourceReference;
use serde::{Deserialize, Serialize};

/// A detected suspension flip, handed to notifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub resource: ResourceReference,
    pub suspended: bool,
    pub acting_principal: String,
    /// Identifies the cluster's hosting context (the Google Cloud project).
    pub cluster_context_id: String,
}

impl ChangeEvent {
    /// Verb describing the new state.
    pub fn action(&self) -> &'static str {
        if self.suspended {
            "suspended"
        } else {
            "resumed"
        }
    }
}
