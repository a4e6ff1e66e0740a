//! Configuration loading from disk and the process environment.
//!
//! Layering, lowest precedence first: defaults, TOML file, environment.
//! CLI overrides are applied by the binary on top of the result.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for environment variable {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the effective configuration: optional file, then process environment.
pub fn load(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// - `PORT`: listener port
/// - `ALLOW_ORIGIN`: CORS origin; when unset or empty, `RENDER` being set
///   removes the origin header entirely
/// - `FAIL_ON_MISSING_MODEL`: `1` or `true` enables
/// - `MODEL_PATH`: model file location
pub fn apply_env<F>(config: &mut ServerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.listener.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: "PORT", value: port.clone() })?;
    }

    match lookup("ALLOW_ORIGIN").filter(|v| !v.is_empty()) {
        Some(origin) => config.cors.allow_origin = Some(origin),
        None if lookup("RENDER").is_some() => config.cors.allow_origin = None,
        None => {}
    }

    if let Some(flag) = lookup("FAIL_ON_MISSING_MODEL") {
        config.model.fail_on_missing = flag == "1" || flag == "true";
    }

    if let Some(path) = lookup("MODEL_PATH").filter(|v| !v.is_empty()) {
        config.model.path = path;
    }

    Ok(())
}
