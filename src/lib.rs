//! Declarative route gateway.
//!
//! Compiles an operator's route list into an immutable, first-match-wins
//! routing table, admits at most one request filter, derives the upstream
//! transport policy, and serves the result through a thin forwarding proxy.

pub mod config;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use filter::{FilterAdmission, FilterRegistry, GatewayFilter};
pub use http::GatewayServer;
pub use lifecycle::{compile_gateway, CompiledGateway, Shutdown, StartupError};
pub use routing::{RouteSpec, RoutingTable};
