use std::env;
use std::fs;
use tempfile::tempdir;

use super::*;

#[test]
fn test_full_config_loading_workflow() {
    env::set_var("SW_IT_SLACK_WEBHOOK", "https://hooks.slack.com/services/T0/B0/secret");
    env::set_var("SW_IT_PROJECT", "acme-prod");

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    let config_content = r#"
google_cloud_project_id: ${SW_IT_PROJECT}
gke_cluster_name: ${SW_IT_CLUSTER:-primary}
store_path: /var/lib/suspendwatch/state.db
kubernetes_config_path: /etc/kube/config

watch:
  reconnect_interval_secs: 30

notification:
  slack:
    - webhook_url: ${SW_IT_SLACK_WEBHOOK}
      filter:
        namespaces: [prod, staging]
        exclude_names: [canary]
        principal_pattern: '@acme\.com$'
        excluded_principal_pattern: '^ci-bot@'
    - webhook_url: https://hooks.slack.com/services/T0/B1/other
      timeout_secs: 10
      filter:
        suspended: true

log:
  level: debug
  format: json
"#;

    fs::write(&path, config_content).unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();

    assert_eq!(config.google_cloud_project_id, "acme-prod");
    assert_eq!(config.gke_cluster_name, "primary");
    assert_eq!(
        config.kubernetes_config_path.as_deref(),
        Some(std::path::Path::new("/etc/kube/config"))
    );

    // Partial watch section merges with defaults
    assert_eq!(config.watch.reconnect_interval_secs, 30);
    assert_eq!(config.watch.reconnect_burst, 3);
    assert!(config.watch.method_pattern.contains("fluxcd"));

    let slack = &config.notification.slack;
    assert_eq!(slack.len(), 2);
    assert_eq!(
        slack[0].webhook_url,
        "https://hooks.slack.com/services/T0/B0/secret"
    );
    assert_eq!(slack[0].timeout_secs, 5);
    let filter = slack[0].filter.as_ref().unwrap();
    assert_eq!(filter.namespaces, vec!["prod", "staging"]);
    assert_eq!(filter.exclude_names, vec!["canary"]);
    assert_eq!(filter.principal_pattern.as_deref(), Some(r"@acme\.com$"));
    assert_eq!(filter.excluded_principal_pattern.as_deref(), Some("^ci-bot@"));
    assert!(filter.suspended.is_none());

    assert_eq!(slack[1].timeout_secs, 10);
    assert_eq!(slack[1].filter.as_ref().unwrap().suspended, Some(true));

    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log.format, "json");

    env::remove_var("SW_IT_SLACK_WEBHOOK");
    env::remove_var("SW_IT_PROJECT");
}
