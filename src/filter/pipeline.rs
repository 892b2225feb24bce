//! Request pipeline middleware.
//! Runs the admitted filter ahead of route dispatch.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::Arc;

use crate::filter::{FilterAdmission, GatewayFilter};

pub async fn filter_middleware(
    State(filter): State<Arc<dyn GatewayFilter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    filter.filter(req, next).await
}

/// Install the admitted filter, if any, as the outermost route layer.
pub fn install<S>(router: Router<S>, admission: &FilterAdmission) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match admission.filter() {
        Some(filter) => {
            tracing::info!(
                filter = admission.admitted_class_name().unwrap_or_default(),
                instance = admission.admitted_type_name().unwrap_or_default(),
                "Request filter installed"
            );
            router.layer(middleware::from_fn_with_state(filter, filter_middleware))
        }
        None => router,
    }
}
