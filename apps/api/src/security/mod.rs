// HTTP hardening applied once, at the composition root.

pub mod cors;
pub mod headers;
pub mod request_id;

use axum::{body::Body, extract::DefaultBodyLimit, http::Request, middleware, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::Config;

pub use headers::SecurityHeaders;
pub use request_id::RequestId;

/// Wraps the router with (innermost first): body size limit, security headers,
/// CORS, request tracing and request IDs.
pub fn harden(router: Router, config: &Config) -> Router {
    let policy = SecurityHeaders {
        hsts: config.is_production(),
    };

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.body_max_bytes))
        .layer(middleware::from_fn_with_state(
            policy,
            headers::security_headers,
        ))
        .layer(cors::cors_layer(&config.cors_allow_origins))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .extensions()
                    .get::<RequestId>()
                    .map(RequestId::as_str)
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(middleware::from_fn(request_id::assign_request_id))
}
