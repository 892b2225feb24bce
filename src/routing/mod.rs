//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup and on reload):
//!     RawRoute[]
//!     → spec.rs (normalize into RouteSpec)
//!     → table.rs (reject duplicate names, compile matchers)
//!     → Freeze as immutable RoutingTable
//!
//! Incoming Request (method, path)
//!     → table.rs (ordered scan)
//!     → matcher.rs (evaluate path pattern AND method set)
//!     → Return: matched CompiledRoute or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment globbing only)
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod spec;
pub mod table;

pub use spec::{HttpMethod, RouteSpec};
pub use table::{CompiledRoute, RoutingTable};
