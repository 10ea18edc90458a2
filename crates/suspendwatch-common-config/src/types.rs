//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use suspendwatch_types::{
    DEFAULT_EXCLUDED_PRINCIPAL_PATTERN, DEFAULT_LABEL_SELECTOR, DEFAULT_METHOD_PATTERN,
};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspendwatchConfig {
    /// Google Cloud project hosting the cluster and its audit logs.
    pub google_cloud_project_id: String,
    /// GKE cluster whose audit logs are tailed.
    pub gke_cluster_name: String,
    /// SQLite database file holding last-known state.
    pub store_path: PathBuf,
    /// Kubeconfig to use. Inferred (in-cluster, then `~/.kube/config`) when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_config_path: Option<PathBuf>,
    /// Discovery and tailing settings.
    pub watch: WatchConfig,
    /// Notification sinks.
    pub notification: NotificationConfig,
    /// Logging settings.
    pub log: LogSettings,
}

impl Default for SuspendwatchConfig {
    fn default() -> Self {
        Self {
            google_cloud_project_id: String::new(),
            gke_cluster_name: String::new(),
            store_path: PathBuf::new(),
            kubernetes_config_path: None,
            watch: WatchConfig::default(),
            notification: NotificationConfig::default(),
            log: LogSettings::default(),
        }
    }
}

/// Discovery and audit log tailing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Label selector picking out Flux CRDs.
    pub label_selector: String,
    /// Regex matched against audit `methodName` for write operations.
    pub method_pattern: String,
    /// Regex for principals excluded from the tail (Flux's own controllers).
    pub excluded_principal_pattern: String,
    /// Reconnects allowed back-to-back before throttling kicks in.
    pub reconnect_burst: u32,
    /// Seconds per reconnect token once the burst is spent.
    pub reconnect_interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            label_selector: DEFAULT_LABEL_SELECTOR.to_string(),
            method_pattern: DEFAULT_METHOD_PATTERN.to_string(),
            excluded_principal_pattern: DEFAULT_EXCLUDED_PRINCIPAL_PATTERN.to_string(),
            reconnect_burst: 3,
            reconnect_interval_secs: 15,
        }
    }
}

/// Notification sinks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Slack incoming webhooks.
    pub slack: Vec<SlackConfig>,
}

/// A single Slack webhook sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Incoming webhook URL.
    pub webhook_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_slack_timeout")]
    pub timeout_secs: u64,
    /// Only deliver events matching this filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,
}

fn default_slack_timeout() -> u64 {
    5
}

/// Criteria a change event must satisfy to be delivered. Empty lists and
/// unset fields match everything; `exclude_*` entries always reject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// API groups, e.g. `helm.toolkit.fluxcd.io`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Plural resource kinds, e.g. `helmreleases`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_kinds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_namespaces: Vec<String>,
    /// Resource names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_names: Vec<String>,
    /// Regex the acting principal must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_pattern: Option<String>,
    /// Regex rejecting matching principals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_principal_pattern: Option<String>,
    /// Only deliver suspensions (`true`) or resumptions (`false`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// trace, debug, info, warn or error.
    pub level: String,
    /// pretty, compact or json.
    pub format: String,
    /// Optional file to mirror logs into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Accepted values for [`LogSettings::level`].
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Accepted values for [`LogSettings::format`].
pub const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];
