use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::security::request_id::REQUEST_ID_HEADER;

/// Builds the CORS policy from the configured origin list.
///
/// `*` allows every origin without credentials (browsers reject a wildcard with
/// credentials). An explicit list is matched exactly and allows credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let expose = [HeaderName::from_static(REQUEST_ID_HEADER)];

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(expose);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers(expose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    async fn preflight(origins: &[&str], origin: &str) -> axum::http::HeaderMap {
        let origins: Vec<String> = origins.iter().map(|s| s.to_string()).collect();
        let app = Router::new()
            .route("/career-insights", post(|| async { "ok" }))
            .layer(cors_layer(&origins));

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/career-insights")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        app.oneshot(request).await.unwrap().headers().clone()
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin() {
        let headers = preflight(&["*"], "https://anywhere.example").await;
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(!headers.contains_key("access-control-allow-credentials"));
    }

    #[tokio::test]
    async fn test_listed_origin_is_allowed_with_credentials() {
        let headers = preflight(&["https://app.example"], "https://app.example").await;
        assert_eq!(
            headers["access-control-allow-origin"],
            "https://app.example"
        );
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_allow_header() {
        let headers = preflight(&["https://app.example"], "https://evil.example").await;
        assert!(!headers.contains_key("access-control-allow-origin"));
    }
}
