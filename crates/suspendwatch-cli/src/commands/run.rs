//! `run`: wire the watcher together and block until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use suspendwatch_auditlog::{GrpcTailTransport, TailFilter, Tailer, TokenSource, LOGGING_ENDPOINT};
use suspendwatch_cluster::{ClientSource, KubeClusterClient};
use suspendwatch_common_config::{FilterConfig, NotificationConfig, SuspendwatchConfig};
use suspendwatch_notify::{
    FilteringNotifier, MultiNotifier, NotificationFilter, Notifier, NotifyError, SlackNotifier,
};
use suspendwatch_store::{SqliteStateStore, SqliteStoreConfig};
use suspendwatch_watcher::Watcher;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;

pub async fn execute(config: SuspendwatchConfig) -> Result<(), CliError> {
    let store = SqliteStateStore::open(SqliteStoreConfig::at(&config.store_path))
        .await
        .with_context(|| format!("opening state store {}", config.store_path.display()))
        .map_err(CliError::Startup)?;
    let store = Arc::new(store);

    let notifier = build_notifier(&config.notification)
        .context("configuring notifications")
        .map_err(CliError::Startup)?;
    if notifier.is_empty() {
        warn!("no notification sinks configured, changes will only be recorded");
    }

    let source = match &config.kubernetes_config_path {
        Some(path) => ClientSource::Kubeconfig(path.clone()),
        None => ClientSource::Infer,
    };
    let cluster = KubeClusterClient::connect(&source)
        .await
        .context("connecting to kubernetes")
        .map_err(CliError::Startup)?;

    let tokens = TokenSource::from_env()
        .context("resolving google cloud credentials")
        .map_err(CliError::Startup)?;
    let transport = GrpcTailTransport::new(LOGGING_ENDPOINT, tokens)
        .context("configuring cloud logging transport")
        .map_err(CliError::Startup)?;

    let filter = TailFilter::new(&config.google_cloud_project_id, &config.gke_cluster_name)
        .method_pattern(&config.watch.method_pattern)
        .excluded_principal_pattern(&config.watch.excluded_principal_pattern);
    let tailer = Tailer::new(Arc::new(transport), filter).with_reconnect_limit(
        config.watch.reconnect_burst,
        Duration::from_secs(config.watch.reconnect_interval_secs),
    );

    let watcher = Watcher::new(
        Arc::new(cluster),
        store.clone(),
        Arc::new(notifier),
        tailer,
    )
    .with_label_selector(&config.watch.label_selector);

    info!(
        project = %config.google_cloud_project_id,
        cluster = %config.gke_cluster_name,
        "starting suspendwatch"
    );

    let cancel = CancellationToken::new();
    let signals = tokio::spawn(shutdown_signal(cancel.clone()));

    let result = watcher.watch(&cancel).await;

    signals.abort();
    store.close().await;

    result?;
    info!("suspendwatch stopped");
    Ok(())
}

/// One Slack sink per configured webhook, each behind its filter if it has one.
pub fn build_notifier(config: &NotificationConfig) -> Result<MultiNotifier, NotifyError> {
    let mut notifier = MultiNotifier::default();
    for slack in &config.slack {
        let sink: Arc<dyn Notifier> = Arc::new(SlackNotifier::new(
            slack.webhook_url.as_str(),
            Duration::from_secs(slack.timeout_secs),
        )?);
        match &slack.filter {
            Some(filter) => notifier.push(Arc::new(FilteringNotifier::new(
                build_filter(filter)?,
                sink,
            ))),
            None => notifier.push(sink),
        }
    }
    Ok(notifier)
}

pub fn build_filter(config: &FilterConfig) -> Result<NotificationFilter, NotifyError> {
    let mut filter = NotificationFilter::new()
        .groups(config.groups.iter().cloned())
        .kinds(config.kinds.iter().cloned())
        .exclude_kinds(config.exclude_kinds.iter().cloned())
        .namespaces(config.namespaces.iter().cloned())
        .exclude_namespaces(config.exclude_namespaces.iter().cloned())
        .names(config.names.iter().cloned())
        .exclude_names(config.exclude_names.iter().cloned());
    if let Some(pattern) = &config.principal_pattern {
        filter = filter.principal_pattern(pattern)?;
    }
    if let Some(pattern) = &config.excluded_principal_pattern {
        filter = filter.excluded_principal_pattern(pattern)?;
    }
    if let Some(suspended) = config.suspended {
        filter = filter.suspended(suspended);
    }
    Ok(filter)
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping watcher");
    cancel.cancel();
}
