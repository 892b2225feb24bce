//! CORS policy.
//!
//! Origins and headers come from configuration; a few request headers and the
//! method list are always allowed. The method list is global and does not
//! follow per-route method restrictions.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer, ExposeHeaders};

use crate::config::validation::{check_trusted_origins, ConfigurationError};
use crate::config::GatewayConfig;

/// Request headers allowed regardless of configuration.
pub const ALWAYS_ALLOWED_HEADERS: [&str; 3] = ["accept", "authorization", "cookie"];

/// Methods allowed for cross-origin requests.
pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
];

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub exposed_headers: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub allow_credentials: bool,
}

impl CorsPolicy {
    /// Fails when `trusted_origins` contains `*`, since credentials are allowed.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigurationError> {
        check_trusted_origins(&config.trusted_origins)?;

        let mut allowed_headers = config.request_headers.clone();
        for header in ALWAYS_ALLOWED_HEADERS {
            if !allowed_headers.iter().any(|h| h.eq_ignore_ascii_case(header)) {
                allowed_headers.push(header.to_string());
            }
        }

        Ok(Self {
            allowed_origins: config.trusted_origins.clone(),
            allowed_headers,
            exposed_headers: config.exposed_headers.clone(),
            allowed_methods: ALLOWED_METHODS.to_vec(),
            allow_credentials: true,
        })
    }

    /// Render as a tower-http layer.
    ///
    /// Credentialed CORS forbids literal `*`. Origins are only ever matched
    /// against the explicit list; a wildcard request header list mirrors the
    /// request and a wildcard exposed header is left out.
    pub fn layer(&self) -> CorsLayer {
        let origins = AllowOrigin::list(self.allowed_origins.iter().filter_map(|o| {
            if o.trim() == WILDCARD {
                tracing::warn!("Ignoring wildcard CORS origin");
                return None;
            }
            HeaderValue::from_str(o)
                .inspect_err(|_| tracing::warn!(origin = %o, "Ignoring invalid CORS origin"))
                .ok()
        }));

        let headers = if self.allowed_headers.iter().any(|h| h == WILDCARD) {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::list(header_names(&self.allowed_headers))
        };

        let exposed = ExposeHeaders::list(header_names(
            &self
                .exposed_headers
                .iter()
                .filter(|h| *h != WILDCARD)
                .cloned()
                .collect::<Vec<_>>(),
        ));

        CorsLayer::new()
            .allow_origin(origins)
            .allow_headers(headers)
            .expose_headers(exposed)
            .allow_methods(self.allowed_methods.clone())
            .allow_credentials(self.allow_credentials)
    }
}

fn header_names(names: &[String]) -> Vec<HeaderName> {
    names
        .iter()
        .filter_map(|n| {
            HeaderName::from_bytes(n.trim().as_bytes())
                .inspect_err(|_| tracing::warn!(header = %n, "Ignoring invalid CORS header name"))
                .ok()
        })
        .collect()
}
