//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Route records are kept loosely typed here; `routing::spec` turns them into
//! validated `RouteSpec`s.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Ordered route definitions. Declaration order is match priority.
    pub routes: Vec<RawRoute>,

    /// Fully-qualified name of the optional request filter.
    pub filter: Option<String>,

    /// Upstream connect timeout in seconds (0 = none).
    pub connection_timeout: u64,

    /// Upstream response timeout in seconds (0 = none).
    pub response_timeout: u64,

    /// Accept invalid upstream TLS certificates.
    pub trust_insecure_ssl: bool,

    /// Response headers exposed to browsers.
    pub exposed_headers: Vec<String>,

    /// Request headers browsers may send.
    pub request_headers: Vec<String>,

    /// Origins allowed by the CORS policy.
    pub trusted_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            logging: LoggingConfig::default(),
            routes: Vec::new(),
            filter: None,
            connection_timeout: 0,
            response_timeout: 0,
            trust_insecure_ssl: true,
            exposed_headers: vec!["*".to_string()],
            request_headers: vec!["*".to_string()],
            trusted_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body buffered for forwarding.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One route entry as written by the operator.
///
/// Every field is optional so that malformed entries reach the parser and get
/// a precise error instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RawRoute {
    /// Route identifier for logging.
    pub name: Option<String>,

    /// Destination base URL (e.g., "https://api.restful-api.dev/").
    pub to: Option<String>,

    /// Path pattern (e.g., "/objects/**").
    pub from: Option<String>,

    /// Allowed methods. Defaults to GET when omitted.
    pub method: Option<MethodList>,
}

impl RawRoute {
    /// Convenience constructor used by tests and embedding hosts.
    pub fn new(name: &str, from: &str, to: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            to: Some(to.to_string()),
            from: Some(from.to_string()),
            method: None,
        }
    }

    /// Set the method list.
    pub fn with_methods(mut self, methods: &[&str]) -> Self {
        self.method = Some(MethodList::Many(
            methods.iter().map(|m| m.to_string()).collect(),
        ));
        self
    }
}

/// Method list accepted either as an array or a comma-separated string.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MethodList {
    One(String),
    Many(Vec<String>),
}

impl MethodList {
    /// Flatten into individual tokens. Blank fragments are dropped.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            MethodList::One(s) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            MethodList::Many(v) => v
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}
