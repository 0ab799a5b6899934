//! Environment variable handling.

use std::env;
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
    /// Function invoked for every mirrored storage operation.
    pub const CRUD_HANDLER_FUNCTION: &str = "CRUD_HANDLER_FUNCTION";
    pub const S3MIRROR_FUNCTION_ENDPOINT: &str = "S3MIRROR_FUNCTION_ENDPOINT";
    pub const S3MIRROR_AUDIT_ENDPOINT: &str = "S3MIRROR_AUDIT_ENDPOINT";
    pub const S3MIRROR_AUDIT_AUTH_TOKEN: &str = "S3MIRROR_AUDIT_AUTH_TOKEN";
    pub const S3MIRROR_AUDIT_QUEUE_CAPACITY: &str = "S3MIRROR_AUDIT_QUEUE_CAPACITY";
    pub const S3MIRROR_INFO_ENDPOINT: &str = "S3MIRROR_INFO_ENDPOINT";
    pub const S3MIRROR_CONFIG_PATH: &str = "S3MIRROR_CONFIG_PATH";
    pub const S3MIRROR_ENV: &str = "S3MIRROR_ENV";

    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment access.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    ///
    /// Missing files are not an error; later files override earlier ones.
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        if let Ok(profile) = env::var(vars::S3MIRROR_ENV) {
            let _ = dotenvy::from_filename(format!(".env.{}", profile));
        }

        Self { _guard: () }
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional, non-empty string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        Self::get(var).unwrap_or_else(|| default.to_string())
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_get_or_default() {
        let val = Environment::get_or("S3MIRROR_NONEXISTENT_VAR", "default");
        assert_eq!(val, "default");
    }

    #[test]
    #[serial]
    fn test_empty_value_is_unset() {
        env::set_var("S3MIRROR_TEST_EMPTY", "");
        assert_eq!(Environment::get("S3MIRROR_TEST_EMPTY"), None);
        env::remove_var("S3MIRROR_TEST_EMPTY");
    }

    #[test]
    #[serial]
    fn test_bool_parsing() {
        env::set_var("S3MIRROR_TEST_BOOL", "yes");
        assert_eq!(Environment::get_bool("S3MIRROR_TEST_BOOL"), Some(true));
        env::set_var("S3MIRROR_TEST_BOOL", "false");
        assert_eq!(Environment::get_bool("S3MIRROR_TEST_BOOL"), Some(false));
        env::remove_var("S3MIRROR_TEST_BOOL");
        assert_eq!(Environment::get_bool("S3MIRROR_TEST_BOOL"), None);
    }

    #[test]
    #[serial]
    fn test_integer_parsing() {
        env::set_var("S3MIRROR_TEST_INT", "42");
        let val: Result<Option<usize>, _> = Environment::get_int("S3MIRROR_TEST_INT");
        assert_eq!(val.unwrap(), Some(42));

        env::set_var("S3MIRROR_TEST_INT", "many");
        let val: Result<Option<usize>, _> = Environment::get_int("S3MIRROR_TEST_INT");
        assert!(matches!(val, Err(EnvError::InvalidValue { .. })));

        env::remove_var("S3MIRROR_TEST_INT");
        let val: Result<Option<usize>, _> = Environment::get_int("S3MIRROR_TEST_INT");
        assert_eq!(val.unwrap(), None);
    }

    #[test]
    #[serial]
    fn test_require_reports_variable() {
        env::remove_var(vars::CRUD_HANDLER_FUNCTION);
        match Environment::require(vars::CRUD_HANDLER_FUNCTION) {
            Err(EnvError::NotSet { var }) => assert_eq!(var, "CRUD_HANDLER_FUNCTION"),
            other => panic!("expected NotSet, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_dotenv_file_loading() {
        use std::fs;
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".env"), "S3MIRROR_TEST_DOTENV=from_dotenv\n").unwrap();

        let original_dir = env::current_dir().unwrap();
        env::remove_var("S3MIRROR_TEST_DOTENV");
        env::set_current_dir(dir.path()).unwrap();

        let _env = Environment::init();
        assert_eq!(
            Environment::get("S3MIRROR_TEST_DOTENV"),
            Some("from_dotenv".to_string())
        );

        env::set_current_dir(original_dir).unwrap();
        env::remove_var("S3MIRROR_TEST_DOTENV");
    }
}
