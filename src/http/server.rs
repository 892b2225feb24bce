//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, CORS, admitted filter)
//! - Dispatch requests through the routing table
//! - Forward matched requests to their destination
//! - Swap in recompiled routing tables on config reload

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::validation::ConfigurationError;
use crate::config::GatewayConfig;
use crate::filter::pipeline;
use crate::http::request::{forward_headers, request_id, upstream_url, MakeRequestUuid};
use crate::http::response::{from_upstream, upstream_error};
use crate::lifecycle::{compile_routes, CompiledGateway};
use crate::routing::RoutingTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ArcSwap<RoutingTable>>,
    pub client: reqwest::Client,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    table: Arc<ArcSwap<RoutingTable>>,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server from configuration and its compiled artifacts.
    pub fn new(config: GatewayConfig, compiled: CompiledGateway) -> Result<Self, reqwest::Error> {
        let CompiledGateway {
            table,
            admission,
            transport,
        } = compiled;

        let table = Arc::new(ArcSwap::from_pointee(table));
        let state = AppState {
            table: table.clone(),
            client: transport.build_client()?,
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Router::new().fallback(dispatch_handler).with_state(state);
        let router = pipeline::install(router, &admission)
            .layer(transport.cors().layer())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Ok(Self {
            router,
            table,
            config,
        })
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Snapshot of the active routing table.
    pub fn routing_table(&self) -> Arc<RoutingTable> {
        self.table.load_full()
    }

    /// Recompile routes from `config` and publish them.
    pub fn reload(&self, config: &GatewayConfig) -> Result<usize, ConfigurationError> {
        apply_reload(&self.table, config)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let table = self.table.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let _ = apply_reload(&table, &config);
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Compile and swap. On error the previous table stays active.
fn apply_reload(
    table: &ArcSwap<RoutingTable>,
    config: &GatewayConfig,
) -> Result<usize, ConfigurationError> {
    match compile_routes(config) {
        Ok(new_table) => {
            let count = new_table.len();
            table.store(Arc::new(new_table));
            tracing::info!(routes = count, "Routing table reloaded");
            Ok(count)
        }
        Err(e) => {
            tracing::error!(error = %e, "Reload rejected; keeping current routing table");
            Err(e)
        }
    }
}

/// Looks up the first matching route and forwards the request.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (route_name, target) = {
        let table = state.table.load();
        match table.match_request(&request) {
            Some(route) => (
                route.name().to_string(),
                upstream_url(route.spec().destination(), request.uri()),
            ),
            None => {
                tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
                return (StatusCode::NOT_FOUND, "No matching route found").into_response();
            }
        }
    };

    tracing::debug!(
        request_id = %request_id,
        route = %route_name,
        method = %method,
        target = %target,
        "Forwarding request"
    );

    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let upstream = state
        .client
        .request(parts.method, target)
        .headers(forward_headers(&parts.headers, client_addr))
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                route = %route_name,
                status = response.status().as_u16(),
                "Upstream responded"
            );
            from_upstream(response)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, route = %route_name, error = %e, "Upstream error");
            upstream_error(&e)
        }
    }
}
