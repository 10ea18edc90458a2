//! Configuration file loading and parsing.

use crate::types::SuspendwatchConfig;
use crate::{LOG_FORMATS, LOG_LEVELS};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
    })
}

/// Configuration loader.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given config file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, expand, parse and validate the config file.
    pub fn load(&self) -> Result<SuspendwatchConfig, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound {
                path: self.path.clone(),
            });
        }

        let contents = std::fs::read_to_string(&self.path)?;
        Self::parse_str(&contents)
    }

    /// Expand, parse and validate config contents.
    pub fn parse_str(contents: &str) -> Result<SuspendwatchConfig, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let config: SuspendwatchConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }

    /// Render a config back to YAML.
    pub fn to_yaml(config: &SuspendwatchConfig) -> Result<String, ConfigError> {
        serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}

/// Validate configuration values.
pub fn validate(config: &SuspendwatchConfig) -> Result<(), ConfigError> {
    if config.google_cloud_project_id.trim().is_empty() {
        return Err(invalid("google_cloud_project_id is required"));
    }
    if config.gke_cluster_name.trim().is_empty() {
        return Err(invalid("gke_cluster_name is required"));
    }
    if config.store_path.as_os_str().is_empty() {
        return Err(invalid("store_path is required"));
    }

    if config.watch.reconnect_burst == 0 {
        return Err(invalid("watch.reconnect_burst must be greater than 0"));
    }
    if config.watch.reconnect_interval_secs == 0 {
        return Err(invalid("watch.reconnect_interval_secs must be greater than 0"));
    }
    if config.watch.label_selector.trim().is_empty() {
        return Err(invalid("watch.label_selector cannot be empty"));
    }

    for (i, slack) in config.notification.slack.iter().enumerate() {
        let url = url::Url::parse(&slack.webhook_url).map_err(|e| {
            invalid(format!("notification.slack[{i}].webhook_url is invalid: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "notification.slack[{i}].webhook_url must be http(s)"
            )));
        }
        if slack.timeout_secs == 0 {
            return Err(invalid(format!(
                "notification.slack[{i}].timeout_secs must be greater than 0"
            )));
        }
        if let Some(filter) = &slack.filter {
            let patterns = [
                ("principal_pattern", &filter.principal_pattern),
                ("excluded_principal_pattern", &filter.excluded_principal_pattern),
            ];
            for (field, pattern) in patterns {
                if let Some(pattern) = pattern {
                    Regex::new(pattern).map_err(|e| {
                        invalid(format!(
                            "notification.slack[{i}].filter.{field} is invalid: {e}"
                        ))
                    })?;
                }
            }
        }
    }

    if !LOG_LEVELS.contains(&config.log.level.to_lowercase().as_str()) {
        return Err(invalid(format!("unknown log.level: {}", config.log.level)));
    }
    if !LOG_FORMATS.contains(&config.log.format.to_lowercase().as_str()) {
        return Err(invalid(format!("unknown log.format: {}", config.log.format)));
    }

    Ok(())
}
