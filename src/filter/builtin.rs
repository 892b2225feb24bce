//! Filters shipped with the gateway binary.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use futures_util::future::BoxFuture;

use crate::filter::GatewayFilter;

/// Type name under which `AccessLogFilter` is registered by the binary.
pub const ACCESS_LOG_FILTER: &str = "route_gateway::filter::builtin::AccessLogFilter";

/// Logs one line per request with status and latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogFilter;

impl GatewayFilter for AccessLogFilter {
    fn filter<'a>(&'a self, request: Request<Body>, next: Next) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let start = Instant::now();
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            let response = next.run(request).await;

            tracing::info!(
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Access"
            );
            response
        })
    }
}
