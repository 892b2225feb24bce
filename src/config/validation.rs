//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every route entry parses into a `RouteSpec`
//! - Route names are unique
//! - Trusted CORS origins are listed explicitly
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<Vec<RouteSpec>, Vec<ConfigurationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::spec::{parse_route, RouteSpec};

/// A malformed or conflicting route entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("route #{index}: missing both path pattern (from) and destination (to)")]
    MissingPathAndDestination { index: usize },

    #[error("route #{index}: missing name")]
    MissingName { index: usize },

    #[error("route '{route}': path pattern (from) is empty")]
    EmptyPathPattern { route: String },

    #[error("route '{route}': destination (to) is empty")]
    EmptyDestination { route: String },

    #[error("route '{route}': invalid path pattern '{pattern}': {reason}")]
    InvalidPathPattern {
        route: String,
        pattern: String,
        reason: String,
    },

    #[error("route '{route}': invalid destination '{destination}': {reason}")]
    InvalidDestination {
        route: String,
        destination: String,
        reason: String,
    },

    #[error("route '{route}': unknown HTTP method '{token}'")]
    UnknownMethod { route: String, token: String },

    #[error("route '{route}': method list is empty")]
    EmptyMethodList { route: String },

    #[error("trusted origin '*' cannot be combined with credentialed CORS; list origins explicitly")]
    WildcardTrustedOrigin,

    #[error("duplicate route name '{name}' (entries #{first} and #{second})")]
    DuplicateRouteName {
        name: String,
        first: usize,
        second: usize,
    },
}

/// Every repeated name in `(index, name)` order, reported against its first entry.
fn duplicate_names<'a>(
    entries: impl IntoIterator<Item = (usize, &'a str)>,
) -> Vec<ConfigurationError> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut errors = Vec::new();
    for (index, name) in entries {
        match first_seen.get(name) {
            Some(&first) => errors.push(ConfigurationError::DuplicateRouteName {
                name: name.to_string(),
                first,
                second: index,
            }),
            None => {
                first_seen.insert(name, index);
            }
        }
    }
    errors
}

/// Check that no two specs share a name.
pub fn check_unique_names(specs: &[RouteSpec]) -> Result<(), ConfigurationError> {
    match duplicate_names(specs.iter().map(RouteSpec::name).enumerate()).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Credentialed CORS cannot trust every origin.
pub fn check_trusted_origins(origins: &[String]) -> Result<(), ConfigurationError> {
    if origins.iter().any(|o| o.trim() == "*") {
        return Err(ConfigurationError::WildcardTrustedOrigin);
    }
    Ok(())
}

/// Validate the whole configuration, collecting every error.
///
/// On success returns the parsed route specs in declaration order.
pub fn validate_config(config: &GatewayConfig) -> Result<Vec<RouteSpec>, Vec<ConfigurationError>> {
    let mut errors = Vec::new();
    let mut parsed: Vec<(usize, RouteSpec)> = Vec::with_capacity(config.routes.len());

    for (index, raw) in config.routes.iter().enumerate() {
        match parse_route(index, raw) {
            Ok(spec) => parsed.push((index, spec)),
            Err(e) => errors.push(e),
        }
    }

    errors.extend(duplicate_names(
        parsed.iter().map(|(index, spec)| (*index, spec.name())),
    ));
    if let Err(e) = check_trusted_origins(&config.trusted_origins) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(parsed.into_iter().map(|(_, spec)| spec).collect())
    } else {
        Err(errors)
    }
}
