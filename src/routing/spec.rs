//! Route specification parsing.
//!
//! # Responsibilities
//! - Normalize raw route records into typed `RouteSpec`s
//! - Parse method tokens case-insensitively into a canonical set
//! - Apply the GET default when no method list is given
//!
//! # Design Decisions
//! - Pure transformation, no I/O
//! - Destinations are parsed once here so the dispatcher never re-parses

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use url::Url;

use crate::config::schema::RawRoute;
use crate::config::validation::ConfigurationError;
use crate::routing::matcher::pattern_error;

/// Known HTTP method tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Map an incoming request method. Extension methods have no counterpart.
    pub fn from_method(method: &Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => Method::GET,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Trace => Method::TRACE,
        }
    }
}

/// A validated path-to-destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    name: String,
    path_pattern: String,
    destination: Url,
    methods: BTreeSet<HttpMethod>,
}

impl RouteSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    pub fn destination(&self) -> &Url {
        &self.destination
    }

    pub fn methods(&self) -> &BTreeSet<HttpMethod> {
        &self.methods
    }

    /// Comma-separated method list for log fields.
    pub fn methods_display(&self) -> String {
        self.methods
            .iter()
            .map(HttpMethod::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a single raw record. `index` is its position in the route list.
pub fn parse_route(index: usize, raw: &RawRoute) -> Result<RouteSpec, ConfigurationError> {
    let from = non_blank(&raw.from);
    let to = non_blank(&raw.to);

    if from.is_none() && to.is_none() {
        return Err(ConfigurationError::MissingPathAndDestination { index });
    }

    let name = non_blank(&raw.name)
        .ok_or(ConfigurationError::MissingName { index })?
        .to_string();

    let path_pattern = from
        .ok_or_else(|| ConfigurationError::EmptyPathPattern { route: name.clone() })?
        .to_string();
    let to = to.ok_or_else(|| ConfigurationError::EmptyDestination { route: name.clone() })?;

    if let Some(reason) = pattern_error(&path_pattern) {
        return Err(ConfigurationError::InvalidPathPattern {
            route: name,
            pattern: path_pattern,
            reason: reason.to_string(),
        });
    }

    let destination = parse_destination(&name, to)?;
    let methods = parse_methods(&name, raw)?;

    Ok(RouteSpec {
        name,
        path_pattern,
        destination,
        methods,
    })
}

/// Parse every record, failing on the first malformed one.
pub fn parse_routes(raw: &[RawRoute]) -> Result<Vec<RouteSpec>, ConfigurationError> {
    raw.iter()
        .enumerate()
        .map(|(index, r)| parse_route(index, r))
        .collect()
}

fn parse_destination(route: &str, to: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidDestination {
        route: route.to_string(),
        destination: to.to_string(),
        reason,
    };

    let url = Url::parse(to).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn parse_methods(route: &str, raw: &RawRoute) -> Result<BTreeSet<HttpMethod>, ConfigurationError> {
    let Some(list) = &raw.method else {
        return Ok(BTreeSet::from([HttpMethod::Get]));
    };

    let tokens = list.tokens();
    if tokens.is_empty() {
        return Err(ConfigurationError::EmptyMethodList {
            route: route.to_string(),
        });
    }

    tokens
        .into_iter()
        .map(|token| {
            token
                .parse::<HttpMethod>()
                .map_err(|_| ConfigurationError::UnknownMethod {
                    route: route.to_string(),
                    token,
                })
        })
        .collect()
}
