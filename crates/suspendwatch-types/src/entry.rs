//! Persisted suspension state.

use crate::ResourceReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Principal recorded when no causal actor is known (bootstrap).
pub const UNKNOWN_PRINCIPAL: &str = "<unknown>";

/// Last-known suspension state of a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEntry {
    pub resource: ResourceReference,
    pub suspended: bool,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl StateEntry {
    /// Create an entry stamped with the current time.
    pub fn new(resource: ResourceReference, suspended: bool, updated_by: impl Into<String>) -> Self {
        Self {
            resource,
            suspended,
            updated_by: updated_by.into(),
            updated_at: Utc::now(),
        }
    }

    /// Record a new observation, restamping actor and time.
    pub fn record(&mut self, resource: ResourceReference, suspended: bool, updated_by: &str) {
        self.resource = resource;
        self.suspended = suspended;
        self.updated_by = updated_by.to_string();
        self.updated_at = Utc::now();
    }
}
