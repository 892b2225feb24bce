//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile routes into the routing table
//! - Decide filter admission
//! - Derive the transport policy
//!
//! # Design Decisions
//! - Fail fast: any fatal condition aborts before the listener binds
//! - Steps run in order, single-threaded, with no I/O of their own
//! - Reload recompiles routes only; filter and transport are fixed

use thiserror::Error;

use crate::config::validation::ConfigurationError;
use crate::config::GatewayConfig;
use crate::filter::{validate_filter, ClassResolver, FilterAdmission, FilterContainer, FilterError};
use crate::net::TransportPolicy;
use crate::routing::spec::parse_routes;
use crate::routing::RoutingTable;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("invalid filter configuration: {0}")]
    Filter(#[from] FilterError),
}

/// Everything the dispatcher needs, computed once.
#[derive(Debug)]
pub struct CompiledGateway {
    pub table: RoutingTable,
    pub admission: FilterAdmission,
    pub transport: TransportPolicy,
}

/// Parse and compile the route list.
pub fn compile_routes(config: &GatewayConfig) -> Result<RoutingTable, ConfigurationError> {
    let specs = parse_routes(&config.routes)?;
    RoutingTable::compile(specs)
}

/// Compile the full gateway from configuration and registered filters.
pub fn compile_gateway(
    config: &GatewayConfig,
    resolver: &dyn ClassResolver,
    container: &dyn FilterContainer,
) -> Result<CompiledGateway, StartupError> {
    let table = compile_routes(config)?;
    tracing::info!(routes = table.len(), "Routing table compiled");

    let admission = validate_filter(config.filter.as_deref(), resolver, container)?;
    let transport = TransportPolicy::from_config(config)?;

    Ok(CompiledGateway {
        table,
        admission,
        transport,
    })
}
