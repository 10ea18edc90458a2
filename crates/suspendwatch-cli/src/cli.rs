//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use suspendwatch_common_config::{ConfigLoader, LogSettings, SuspendwatchConfig};
use suspendwatch_common_log::{LogConfig, LogFormat, LogLevel};

use crate::error::CliError;

/// Watches Flux CD resources for suspend/resume and reports who did it.
#[derive(Debug, Parser)]
#[command(name = "suspendwatch", author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "CONFIG_PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Log output format, overriding the config file
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Watch for suspend changes until interrupted (default)
    Run,
    /// Validate the configuration and print it with defaults filled in
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    pub fn load_config(&self) -> Result<SuspendwatchConfig, CliError> {
        let path = self.config.as_ref().ok_or(CliError::MissingConfig)?;
        Ok(ConfigLoader::new(path).load()?)
    }

    /// Logging setup: config file, then environment, then flags.
    pub fn log_config(&self, settings: &LogSettings) -> LogConfig {
        let mut config = LogConfig {
            level: LogLevel::parse(&settings.level).unwrap_or_default(),
            format: LogFormat::parse(&settings.format).unwrap_or_default(),
            file_path: settings.file.clone(),
            source_location: false,
        }
        .with_env();

        match self.verbose {
            0 => {}
            1 => config.level = LogLevel::Debug,
            _ => {
                config.level = LogLevel::Trace;
                config.source_location = true;
            }
        }

        if let Some(format) = self.log_format {
            config.format = format.into();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["suspendwatch", "--config", "/etc/sw.yaml"]).unwrap();
        assert_eq!(cli.command(), Command::Run);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/sw.yaml")));
    }

    #[test]
    fn test_check_config_subcommand() {
        let cli = Cli::try_parse_from(["suspendwatch", "check-config", "-c", "x.yaml"]).unwrap();
        assert_eq!(cli.command(), Command::CheckConfig);
    }

    #[test]
    fn test_flags_override_settings() {
        let cli =
            Cli::try_parse_from(["suspendwatch", "-vv", "--log-format", "json", "run"]).unwrap();
        let config = cli.log_config(&LogSettings::default());
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.source_location);
    }

    #[test]
    fn test_settings_used_without_flags() {
        let cli = Cli::try_parse_from(["suspendwatch"]).unwrap();
        let settings = LogSettings {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file: Some(PathBuf::from("/tmp/sw.log")),
        };
        let config = cli.log_config(&settings);
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/sw.log")));
    }
}
