//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, upstream URL, forwarded headers)
//!     → [admitted filter, if any]
//!     → [routing table picks the first matching route]
//!     → response.rs (strip hop-by-hop, map upstream errors)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::GatewayServer;
