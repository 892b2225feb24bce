//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (route, filter, request_id)
//!     → logging.rs (subscriber, env filter, fmt output)
//!
//! HTTP layer adds:
//!     → request IDs (http/request.rs)
//!     → TraceLayer spans per request
//! ```

pub mod logging;

pub use logging::init_logging;
