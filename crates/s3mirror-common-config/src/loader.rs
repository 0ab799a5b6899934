//! Configuration file loading and parsing.

use crate::env::{vars, EnvError, Environment};
use crate::types::{MirrorConfig, S3MirrorConfig, MAX_QUEUE_CAPACITY};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

static ENV_VAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is a valid regex")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
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

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader reading `.s3mirror/config.yaml` under the given directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_dir.as_ref().join(".s3mirror/config.yaml"),
        }
    }

    /// Create a loader for an explicit file path.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Create a loader honouring `S3MIRROR_CONFIG_PATH`, falling back to the
    /// current directory.
    pub fn from_env() -> Self {
        match Environment::get(vars::S3MIRROR_CONFIG_PATH) {
            Some(path) => Self::from_file(path),
            None => Self::new(std::env::current_dir().unwrap_or_default()),
        }
    }

    /// Load configuration, apply environment overrides and validate.
    ///
    /// A missing file yields defaults.
    pub fn load(&self) -> Result<S3MirrorConfig, ConfigError> {
        let mut config = if self.config_path.exists() {
            let contents = std::fs::read_to_string(&self.config_path)?;
            let expanded = self.expand_env_vars(&contents)?;
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        } else {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            S3MirrorConfig::default()
        };

        apply_env_overrides(&mut config)?;
        validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_PATTERN.captures_iter(content) {
            let Some(full_match) = cap.get(0) else {
                continue;
            };
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

            result = result.replace(full_match.as_str(), &value);
        }

        Ok(result)
    }

    /// Save configuration to the loader's path.
    pub fn save(&self, config: &S3MirrorConfig) -> Result<(), ConfigError> {
        if let Some(dir) = self.config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&self.config_path, yaml)?;
        Ok(())
    }
}

/// Apply the well-known environment variables on top of file values.
pub fn apply_env_overrides(config: &mut S3MirrorConfig) -> Result<(), ConfigError> {
    if let Some(name) = Environment::get(vars::CRUD_HANDLER_FUNCTION) {
        config.mirror.function_name = name;
    }
    if let Some(endpoint) = Environment::get(vars::S3MIRROR_FUNCTION_ENDPOINT) {
        config.mirror.endpoint = endpoint;
    }
    if let Some(endpoint) = Environment::get(vars::S3MIRROR_AUDIT_ENDPOINT) {
        config.audit.endpoint = endpoint;
    }
    if let Some(token) = Environment::get(vars::S3MIRROR_AUDIT_AUTH_TOKEN) {
        config.audit.auth_token = Some(token);
    }
    if let Some(capacity) = Environment::get_int(vars::S3MIRROR_AUDIT_QUEUE_CAPACITY)? {
        config.audit.queue_capacity = capacity;
    }
    if let Some(endpoint) = Environment::get(vars::S3MIRROR_INFO_ENDPOINT) {
        config.enrichment.info_endpoint = endpoint;
    }
    Ok(())
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|e| ConfigError::ValidationError {
        message: format!("{} is not a valid URL ({}): {}", field, value, e),
    })
}

/// Validate the settings a mirroring invoker needs.
pub fn validate_mirror(config: &MirrorConfig) -> Result<(), ConfigError> {
    let name = &config.function_name;
    if name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            message: "mirror.function_name must be set".to_string(),
        });
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError {
            message: format!("mirror.function_name is not a valid function name: {:?}", name),
        });
    }
    Ok(())
}

/// Validate configuration values.
///
/// An empty `mirror.function_name` passes so audit-only deployments load;
/// [`validate_mirror`] rejects it when an invoker is built.
pub fn validate(config: &S3MirrorConfig) -> Result<(), ConfigError> {
    check_url("mirror.endpoint", &config.mirror.endpoint)?;
    check_url("enrichment.info_endpoint", &config.enrichment.info_endpoint)?;

    if config.audit.enabled {
        check_url("audit.endpoint", &config.audit.endpoint)?;
    }

    if config.audit.queue_capacity == 0 {
        return Err(ConfigError::ValidationError {
            message: "audit.queue_capacity must be greater than 0".to_string(),
        });
    }
    if config.audit.queue_capacity > MAX_QUEUE_CAPACITY {
        return Err(ConfigError::ValidationError {
            message: format!(
                "audit.queue_capacity must be at most {}, got {}",
                MAX_QUEUE_CAPACITY, config.audit.queue_capacity
            ),
        });
    }

    if !config.mirror.function_name.is_empty() {
        validate_mirror(&config.mirror)?;
    }

    if config.mirror.timeout_ms == 0
        || config.audit.timeout_ms == 0
        || config.enrichment.timeout_ms == 0
    {
        return Err(ConfigError::ValidationError {
            message: "timeouts must be greater than 0".to_string(),
        });
    }

    if config.announce.enabled {
        for gateway in &config.announce.gateways {
            check_url("announce.gateways", gateway)?;
        }
    }

    Ok(())
}
