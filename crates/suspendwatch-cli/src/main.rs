//! suspendwatch
//!
//! Main entry point for the `suspendwatch` binary.

use std::process::ExitCode;

use clap::Parser;
use suspendwatch_common_config::Environment;
use tracing::error;

mod cli;
mod commands;
mod error;

use cli::{Cli, Command};

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    StartupError = 3,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let _env = Environment::init();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return e.exit_code().into();
        }
    };

    if let Command::CheckConfig = cli.command() {
        return match commands::check_config::execute(&config) {
            Ok(()) => Exit::Success.into(),
            Err(e) => {
                eprintln!("error: {e}");
                e.exit_code().into()
            }
        };
    }

    if let Err(e) = suspendwatch_common_log::init(cli.log_config(&config.log)) {
        eprintln!("error: {e}");
        return Exit::GeneralError.into();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(commands::run::execute(config)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            e.exit_code().into()
        }
    }
}
