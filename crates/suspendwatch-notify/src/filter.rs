//! Predicate-gated delivery.

use crate::{Notifier, NotifyError};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use suspendwatch_types::ChangeEvent;
use tracing::debug;

/// Allow and deny lists over one string attribute of an event.
#[derive(Debug, Clone, Default)]
struct Criterion {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Criterion {
    fn accepts(&self, value: &str) -> bool {
        (self.include.is_empty() || self.include.iter().any(|v| v == value))
            && !self.exclude.iter().any(|v| v == value)
    }
}

fn collect<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

/// Criteria a [`ChangeEvent`] must meet to be delivered.
///
/// Every criterion that is set must match. Allow lists accept any listed
/// value; exclusions win over allow lists. An empty filter matches all events.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    groups: Criterion,
    kinds: Criterion,
    namespaces: Criterion,
    names: Criterion,
    principal: Option<Regex>,
    excluded_principal: Option<Regex>,
    suspended: Option<bool>,
}

impl NotificationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to these API groups.
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.include = collect(groups);
        self
    }

    /// Restrict to these plural kinds.
    pub fn kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds.include = collect(kinds);
        self
    }

    pub fn exclude_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds.exclude = collect(kinds);
        self
    }

    /// Restrict to these namespaces.
    pub fn namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces.include = collect(namespaces);
        self
    }

    pub fn exclude_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces.exclude = collect(namespaces);
        self
    }

    /// Restrict to resources with these names.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.include = collect(names);
        self
    }

    pub fn exclude_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.exclude = collect(names);
        self
    }

    /// Require the acting principal to match `pattern`.
    pub fn principal_pattern(mut self, pattern: &str) -> Result<Self, NotifyError> {
        self.principal = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Drop events whose acting principal matches `pattern`.
    pub fn excluded_principal_pattern(mut self, pattern: &str) -> Result<Self, NotifyError> {
        self.excluded_principal = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Only pass suspensions (`true`) or resumptions (`false`).
    pub fn suspended(mut self, suspended: bool) -> Self {
        self.suspended = Some(suspended);
        self
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        let resource = &event.resource;
        let principal = event.acting_principal.as_str();

        self.groups.accepts(&resource.resource_type.group)
            && self.kinds.accepts(&resource.resource_type.kind)
            && self.namespaces.accepts(&resource.namespace)
            && self.names.accepts(&resource.name)
            && self.principal.as_ref().map_or(true, |p| p.is_match(principal))
            && !self
                .excluded_principal
                .as_ref()
                .is_some_and(|p| p.is_match(principal))
            && self.suspended.map_or(true, |s| s == event.suspended)
    }
}

/// Forwards only the events its filter accepts.
pub struct FilteringNotifier {
    filter: NotificationFilter,
    inner: Arc<dyn Notifier>,
}

impl FilteringNotifier {
    pub fn new(filter: NotificationFilter, inner: Arc<dyn Notifier>) -> Self {
        Self { filter, inner }
    }
}

#[async_trait]
impl Notifier for FilteringNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        if !self.filter.matches(event) {
            debug!(resource = %event.resource, "event filtered out");
            return Ok(());
        }
        self.inner.notify(event).await
    }
}
