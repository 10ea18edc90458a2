//! Environment variable handling.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const CONFIG_PATH: &str = "CONFIG_PATH";

    // Logging
    pub const SUSPENDWATCH_LOG_LEVEL: &str = "SUSPENDWATCH_LOG_LEVEL";
    pub const SUSPENDWATCH_LOG_FORMAT: &str = "SUSPENDWATCH_LOG_FORMAT";
    pub const SUSPENDWATCH_LOG_FILE: &str = "SUSPENDWATCH_LOG_FILE";

    // Google Cloud
    pub const GOOGLE_OAUTH_ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

    // Development
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment access helpers.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` then `.env.local` from the working directory, if present.
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");
        Self { _guard: () }
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        match env::var(var) {
            Ok(v) if !v.is_empty() => Ok(v),
            _ => Err(EnvError::NotSet {
                var: var.to_string(),
            }),
        }
    }

    /// Get an optional, non-empty string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: "expected integer".to_string(),
            }),
            Err(_) => Ok(None),
        }
    }

    /// Config file location from `CONFIG_PATH`.
    pub fn config_path() -> Result<PathBuf, EnvError> {
        Self::require(vars::CONFIG_PATH).map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_empty() {
        env::set_var("SW_EMPTY_VAR", "");
        assert!(matches!(
            Environment::require("SW_EMPTY_VAR"),
            Err(EnvError::NotSet { .. })
        ));
        assert!(Environment::get("SW_EMPTY_VAR").is_none());
        env::remove_var("SW_EMPTY_VAR");
    }

    #[test]
    fn test_bool_parsing() {
        env::set_var("SW_TEST_BOOL", "true");
        assert_eq!(Environment::get_bool("SW_TEST_BOOL"), Some(true));
        env::set_var("SW_TEST_BOOL", "1");
        assert_eq!(Environment::get_bool("SW_TEST_BOOL"), Some(true));
        env::set_var("SW_TEST_BOOL", "false");
        assert_eq!(Environment::get_bool("SW_TEST_BOOL"), Some(false));
        env::remove_var("SW_TEST_BOOL");
        assert_eq!(Environment::get_bool("SW_TEST_BOOL"), None);
    }

    #[test]
    fn test_integer_parsing() {
        env::set_var("SW_TEST_INT", "42");
        let val: Result<Option<u32>, _> = Environment::get_int("SW_TEST_INT");
        assert_eq!(val.unwrap(), Some(42));

        env::set_var("SW_TEST_INT", "invalid");
        let val: Result<Option<u32>, _> = Environment::get_int("SW_TEST_INT");
        assert!(val.is_err());

        env::remove_var("SW_TEST_INT");
        let val: Result<Option<u32>, _> = Environment::get_int("SW_TEST_INT");
        assert_eq!(val.unwrap(), None);
    }
}
