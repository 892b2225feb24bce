//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and echo it on the response
//! - Build the upstream URL from the route destination and request URI
//! - Prepare headers for forwarding (hop-by-hop removal, X-Forwarded-*)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Only scheme and authority of the destination are used; the request
//!   path and query are forwarded unchanged

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::http::response::strip_hop_by_hop;

pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header value, or "unknown".
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Destination origin joined with the request's own path and query.
pub fn upstream_url(destination: &Url, uri: &Uri) -> Url {
    let mut url = destination.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());
    url
}

/// Headers to send upstream.
pub fn forward_headers(incoming: &HeaderMap, client: Option<SocketAddr>) -> HeaderMap {
    let mut headers = incoming.clone();
    strip_hop_by_hop(&mut headers);

    if let Some(host) = headers.remove(header::HOST) {
        headers.insert(X_FORWARDED_HOST, host);
    }

    if let Some(addr) = client {
        let ip = addr.ip().to_string();
        let value = match incoming.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) => format!("{prior}, {ip}"),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_upstream_url_keeps_request_path() {
        let destination = Url::parse("https://api.restful-api.dev/ignored").unwrap();
        let uri: Uri = "/objects/7?expand=true".parse().unwrap();
        assert_eq!(
            upstream_url(&destination, &uri).as_str(),
            "https://api.restful-api.dev/objects/7?expand=true"
        );
    }

    #[test]
    fn test_upstream_url_keeps_port() {
        let destination = Url::parse("http://127.0.0.1:9001/").unwrap();
        let uri: Uri = "/a".parse().unwrap();
        assert_eq!(upstream_url(&destination, &uri).as_str(), "http://127.0.0.1:9001/a");
    }

    #[test]
    fn test_forward_headers() {
        let mut incoming = HeaderMap::new();
        incoming.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        incoming.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        incoming.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        incoming.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));

        let client: SocketAddr = "192.168.1.5:5000".parse().unwrap();
        let headers = forward_headers(&incoming, Some(client));

        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert_eq!(headers.get("x-forwarded-host").unwrap(), "gateway.local");
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "10.0.0.1, 192.168.1.5");
        assert_eq!(headers.get("x-forwarded-proto").unwrap(), "http");
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer t");
    }

    #[test]
    fn test_make_request_id() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = MakeRequestUuid.make_request_id(&req).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
        assert_eq!(request_id(&req), "unknown");
    }
}
