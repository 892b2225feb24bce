//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig scalars
//!     → transport.rs (timeouts, TLS trust, upstream client)
//!     → cors.rs (origins, headers, fixed methods → CorsLayer)
//!     → Handed to the HTTP server
//! ```
//!
//! # Design Decisions
//! - Pure derivation: no state beyond the configuration snapshot
//! - Derived once at startup; a reload does not change transport settings

pub mod cors;
pub mod transport;

pub use cors::CorsPolicy;
pub use transport::TransportPolicy;
