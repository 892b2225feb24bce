//! Routing table compilation and lookup.
//!
//! # Responsibilities
//! - Compile `RouteSpec`s into matchers, one per route
//! - Look up the first matching route for a request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Declaration order is priority; no sorting or path dedup
//! - O(n) scan (acceptable for typical route counts)
//! - Shadowed routes are logged, not rejected

use axum::http::{Method, Request};

use crate::config::validation::{check_unique_names, ConfigurationError};
use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, PathPatternMatcher};
use crate::routing::spec::RouteSpec;

/// A route together with its compiled matcher.
#[derive(Debug)]
pub struct CompiledRoute {
    spec: RouteSpec,
    path: PathPatternMatcher,
    matcher: AndMatcher,
}

impl CompiledRoute {
    fn new(spec: RouteSpec) -> Self {
        let path = PathPatternMatcher::new(spec.path_pattern());
        let matcher = AndMatcher::new(vec![
            Box::new(path.clone()),
            Box::new(MethodMatcher::new(spec.methods().clone())),
        ]);
        Self { spec, path, matcher }
    }

    pub fn spec(&self) -> &RouteSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.matcher.matches(method, path)
    }

    /// True if every request accepted by `later` is accepted by `self`.
    ///
    /// Only decidable here for literal patterns; wildcard pairs are skipped.
    fn shadows(&self, later: &CompiledRoute) -> bool {
        let Some(literal) = later.path.literal_path() else {
            return false;
        };
        self.path.matches_path(&literal) && later.spec.methods().is_subset(self.spec.methods())
    }
}

/// Ordered, immutable collection of compiled routes.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: Vec<CompiledRoute>,
}

impl RoutingTable {
    /// Compile specs in declaration order.
    ///
    /// An empty list yields an empty table that matches nothing.
    pub fn compile(specs: Vec<RouteSpec>) -> Result<Self, ConfigurationError> {
        check_unique_names(&specs)?;

        let mut routes: Vec<CompiledRoute> = Vec::with_capacity(specs.len());
        for spec in specs {
            tracing::info!(
                name = %spec.name(),
                destination = %spec.destination(),
                pattern = %spec.path_pattern(),
                methods = %spec.methods_display(),
                "Route compiled"
            );

            let route = CompiledRoute::new(spec);
            if let Some(earlier) = routes.iter().find(|r| r.shadows(&route)) {
                tracing::warn!(
                    route = %route.name(),
                    shadowed_by = %earlier.name(),
                    pattern = %route.spec.path_pattern(),
                    "Route is unreachable: an earlier route matches all of its requests"
                );
            }
            routes.push(route);
        }

        if routes.is_empty() {
            tracing::info!("No routes configured; every request will be answered with 404");
        }

        Ok(Self { routes })
    }

    /// First route accepting this method and path.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&CompiledRoute> {
        self.routes.iter().find(|r| r.matches(method, path))
    }

    /// Look up the route for a request.
    pub fn match_request<B>(&self, req: &Request<B>) -> Option<&CompiledRoute> {
        self.lookup(req.method(), req.uri().path())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    /// Route names in table order.
    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(CompiledRoute::name).collect()
    }
}
