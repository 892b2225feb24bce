//! End-to-end tests: compiled configuration served through the gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use route_gateway::config::RawRoute;
use route_gateway::filter::{FilterRegistry, GatewayFilter};
use route_gateway::GatewayConfig;

mod common;

struct RequireApiKey;

impl GatewayFilter for RequireApiKey {
    fn filter<'a>(&'a self, request: Request<Body>, next: Next) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if request.headers().contains_key("x-api-key") {
                next.run(request).await
            } else {
                (StatusCode::UNAUTHORIZED, "missing api key").into_response()
            }
        })
    }
}

fn http(addr: std::net::SocketAddr) -> String {
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_first_match_wins_end_to_end() {
    let x = common::start_echo_backend("x").await;
    let y = common::start_echo_backend("y").await;

    let mut config = GatewayConfig::default();
    config
        .routes
        .push(RawRoute::new("a", "/objects/**", &http(x)).with_methods(&["GET", "POST"]));
    config.routes.push(RawRoute::new("b", "/objects", &http(y)));
    config.routes.push(RawRoute::new("c", "/dogs/*", &http(y)));

    let gateway = common::start_gateway(config, FilterRegistry::new()).await;
    let client = common::client();

    let res = client.get(gateway.url("/objects")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-backend"], "x");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "x GET /objects ");

    let res = client
        .post(gateway.url("/objects/7?expand=true"))
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "x POST /objects/7?expand=true payload");

    let res = client.get(gateway.url("/dogs/husky")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "y");
    assert_eq!(
        res.headers()["x-seen-host"],
        gateway.addr.to_string().as_str()
    );
}

#[tokio::test]
async fn test_unmatched_requests_are_404() {
    let x = common::start_echo_backend("x").await;
    let mut config = GatewayConfig::default();
    config.routes.push(RawRoute::new("a", "/objects/**", &http(x)));

    let gateway = common::start_gateway(config, FilterRegistry::new()).await;
    let client = common::client();

    let res = client.get(gateway.url("/elsewhere")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(gateway.url("/objects/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_table_forwards_nothing() {
    let gateway = common::start_gateway(GatewayConfig::default(), FilterRegistry::new()).await;
    let res = common::client().get(gateway.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admitted_filter_runs_before_dispatch() {
    let x = common::start_echo_backend("x").await;
    let mut config = GatewayConfig {
        filter: Some("tests::RequireApiKey".into()),
        ..Default::default()
    };
    config.routes.push(RawRoute::new("a", "/a/**", &http(x)));

    let mut registry = FilterRegistry::new();
    registry.register_filter("tests::RequireApiKey", Arc::new(RequireApiKey));

    let gateway = common::start_gateway(config, registry).await;
    let client = common::client();

    let res = client.get(gateway.url("/a")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(gateway.url("/a"))
        .header("x-api-key", "k")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The filter also guards unmatched paths: it runs ahead of dispatch.
    let res = client.get(gateway.url("/other")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unresolved_filter_leaves_gateway_open() {
    let x = common::start_echo_backend("x").await;
    let mut config = GatewayConfig {
        filter: Some("tests::DoesNotExist".into()),
        ..Default::default()
    };
    config.routes.push(RawRoute::new("a", "/**", &http(x)));

    let mut registry = FilterRegistry::new();
    registry.register_filter("tests::RequireApiKey", Arc::new(RequireApiKey));

    let gateway = common::start_gateway(config, registry).await;
    let res = common::client().get(gateway.url("/a")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reload_replaces_routes() {
    let x = common::start_echo_backend("x").await;
    let y = common::start_echo_backend("y").await;

    let mut config = GatewayConfig::default();
    config.routes.push(RawRoute::new("a", "/api/**", &http(x)));
    let gateway = common::start_gateway(config, FilterRegistry::new()).await;
    let client = common::client();

    let res = client.get(gateway.url("/api/v1")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "x");

    let mut next = GatewayConfig::default();
    next.routes.push(RawRoute::new("b", "/api/**", &http(y)));
    gateway.reload_tx.send(next).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client.get(gateway.url("/api/v1")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "y");
}

#[tokio::test]
async fn test_unreachable_upstream_is_502() {
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let mut config = GatewayConfig::default();
    config.routes.push(RawRoute::new("down", "/**", &http(closed)));
    let gateway = common::start_gateway(config, FilterRegistry::new()).await;

    let res = common::client().get(gateway.url("/x")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_response_timeout_is_504() {
    let silent = common::start_silent_backend().await;

    let mut config = GatewayConfig {
        response_timeout: 1,
        ..Default::default()
    };
    config.routes.push(RawRoute::new("slow", "/**", &http(silent)));
    let gateway = common::start_gateway(config, FilterRegistry::new()).await;

    let res = common::client().get(gateway.url("/x")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_upstream_body_is_streamed() {
    let trickle = common::start_trickle_backend().await;

    let mut config = GatewayConfig::default();
    config.routes.push(RawRoute::new("feed", "/**", &http(trickle)));
    let gateway = common::start_gateway(config, FilterRegistry::new()).await;

    let mut res = tokio::time::timeout(
        Duration::from_secs(2),
        common::client().get(gateway.url("/feed")).send(),
    )
    .await
    .expect("headers arrive before the upstream body completes")
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-backend"], "trickle");

    let chunk = tokio::time::timeout(Duration::from_secs(2), res.chunk())
        .await
        .expect("first chunk is relayed without waiting for the rest")
        .unwrap()
        .unwrap();
    assert_eq!(&chunk[..], b"first");
}

#[tokio::test]
async fn test_wildcard_trusted_origin_is_rejected() {
    let config = GatewayConfig {
        trusted_origins: vec!["*".into()],
        ..Default::default()
    };
    let registry = FilterRegistry::new();
    let err = route_gateway::compile_gateway(&config, &registry, &registry).unwrap_err();
    assert!(err.to_string().contains("trusted origin '*'"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let gateway = common::start_gateway(GatewayConfig::default(), FilterRegistry::new()).await;

    let res = common::client()
        .request(reqwest::Method::OPTIONS, gateway.url("/objects"))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "DELETE")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    let methods = res.headers()["access-control-allow-methods"].to_str().unwrap();
    for m in ["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"] {
        assert!(methods.contains(m), "{m} missing from {methods}");
    }
}
