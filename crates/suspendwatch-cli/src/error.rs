//! CLI error handling.

use suspendwatch_common_config::ConfigError;
use suspendwatch_watcher::WatchError;
use thiserror::Error;

use crate::Exit;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no configuration file given (use --config or set CONFIG_PATH)")]
    MissingConfig,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0:#}")]
    Startup(anyhow::Error),

    #[error("watcher stopped: {0}")]
    Watch(#[from] WatchError),
}

impl CliError {
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::MissingConfig | Self::Config(_) => Exit::ConfigError,
            Self::Startup(_) => Exit::StartupError,
            Self::Watch(_) => Exit::GeneralError,
        }
    }
}
