//! `check-config`: print the effective configuration.

use suspendwatch_common_config::{ConfigLoader, SuspendwatchConfig};

use crate::error::CliError;

pub fn execute(config: &SuspendwatchConfig) -> Result<(), CliError> {
    let yaml = ConfigLoader::to_yaml(config)?;
    print!("{yaml}");
    Ok(())
}
