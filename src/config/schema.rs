//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the prediction server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, backlog).
    pub listener: ListenerConfig,

    /// Protocol limits applied per connection.
    pub limits: LimitsConfig,

    /// CORS headers added to prediction responses.
    pub cors: CorsConfig,

    /// Model file settings.
    pub model: ModelConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Startup / shutdown settings.
    pub lifecycle: LifecycleConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Pending-connection queue length passed to listen(2).
    pub backlog: u32,

    /// Maximum concurrent connections. `None` means unbounded.
    pub max_connections: Option<usize>,
}

impl ListenerConfig {
    /// `host:port` as a single string.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            backlog: 16,
            max_connections: None,
        }
    }
}

/// Per-connection protocol limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Stop reading the request head after this many bytes.
    pub max_head_bytes: usize,

    /// Longest accepted chunk-size or trailer line.
    pub max_chunk_line_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_head_bytes: 64 * 1024,
            max_chunk_line_bytes: 1024,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Value for `Access-Control-Allow-Origin`; omitted when `None`.
    pub allow_origin: Option<String>,

    /// Value for `Access-Control-Allow-Headers`.
    pub allow_headers: String,

    /// Value for `Access-Control-Allow-Methods`.
    pub allow_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: Some("*".to_string()),
            allow_headers: "Content-Type".to_string(),
            allow_methods: "POST, OPTIONS".to_string(),
        }
    }
}

/// Model file configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the model file.
    pub path: String,

    /// Refuse to start when the model file is missing.
    pub fail_on_missing: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/model.onnx".to_string(),
            fail_on_missing: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "predict_server=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long in-flight connections may run after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 5,
        }
    }
}
