//! Request filter subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     configured filter name
//!     + registry.rs (type descriptors, registered filter instances)
//!     → validator.rs (at-most-one admission)
//!     → FilterAdmission (Disabled | Admitted)
//!
//! Per request (only when admitted):
//!     → pipeline.rs (axum middleware)
//!     → GatewayFilter::filter(request, next)
//!     → route dispatch
//! ```
//!
//! # Design Decisions
//! - No reflection: hosts register filter types and instances explicitly
//! - Admission happens once; there is no hot-swap or per-request toggle
//! - Ambiguity is fatal, a missing filter is not

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use futures_util::future::BoxFuture;

pub mod builtin;
pub mod pipeline;
pub mod registry;
pub mod validator;

pub use registry::{ClassResolver, FilterCandidate, FilterContainer, FilterRegistry, FilterTypeInfo};
pub use validator::{validate_filter, DisableReason, FilterAdmission, FilterError, InvalidTypeReason};

/// The filter capability: intercept a request before it is dispatched.
///
/// Implementations may short-circuit by returning a response without calling
/// `next`, or call `next.run(request)` to continue to the route.
pub trait GatewayFilter: Send + Sync {
    fn filter<'a>(&'a self, request: Request<Body>, next: Next) -> BoxFuture<'a, Response>;
}
