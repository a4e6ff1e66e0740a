//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (backlog > 0, limits large enough to be useful)
//! - Check that addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// Smallest head buffer that can hold a request line.
const MIN_HEAD_BYTES: usize = 16;

/// Smallest chunk line: one digit plus CRLF.
const MIN_CHUNK_LINE_BYTES: usize = 3;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = config.listener.bind_address();
    if bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.host",
            format!("{bind:?} is not a valid socket address"),
        ));
    }

    if config.listener.backlog == 0 {
        errors.push(ValidationError::new("listener.backlog", "must be greater than 0"));
    }

    if config.listener.max_connections == Some(0) {
        errors.push(ValidationError::new(
            "listener.max_connections",
            "must be greater than 0 when set",
        ));
    }

    if config.limits.max_head_bytes < MIN_HEAD_BYTES {
        errors.push(ValidationError::new(
            "limits.max_head_bytes",
            format!("must be at least {MIN_HEAD_BYTES}"),
        ));
    }

    if config.limits.max_chunk_line_bytes < MIN_CHUNK_LINE_BYTES {
        errors.push(ValidationError::new(
            "limits.max_chunk_line_bytes",
            format!("must be at least {MIN_CHUNK_LINE_BYTES}"),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a valid socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.host = "not a host".into();
        config.listener.backlog = 0;
        config.limits.max_chunk_line_bytes = 1;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["listener.host", "listener.backlog", "limits.max_chunk_line_bytes"]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }

    #[test]
    fn zero_connection_bound_is_invalid() {
        let mut config = ServerConfig::default();
        config.listener.max_connections = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
