//! Security headers middleware
//!
//! Adds standard security headers to every response, errors included.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::SecurityHeadersConfig;

/// Security headers middleware function
///
/// Adds the following security headers to all responses:
/// - X-Content-Type-Options: nosniff
/// - Strict-Transport-Security: max-age=<configured>[; includeSubDomains]
/// - X-Frame-Options: DENY
/// - Referrer-Policy: strict-origin-when-cross-origin
/// - Cache-Control: no-store
/// - Content-Security-Policy: default-src 'none'; frame-ancestors 'none'
///
/// The function is only ever reached over HTTPS (API Gateway or a TLS
/// terminating proxy), so HSTS is sent unconditionally.
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    if let Ok(value) = HeaderValue::from_str(&hsts_value(&config)) {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
    }

    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // Responses carry short-lived credentials
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}

fn hsts_value(config: &SecurityHeadersConfig) -> String {
    let mut value = format!("max-age={}", config.hsts_max_age_secs);
    if config.hsts_include_subdomains {
        value.push_str("; includeSubDomains");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    async fn failing_handler() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    fn app(cfg: SecurityHeadersConfig) -> Router {
        Router::new()
            .route("/test", get(dummy_handler))
            .route("/fail", get(failing_handler))
            .layer(axum::middleware::from_fn_with_state(
                cfg,
                security_headers_middleware,
            ))
    }

    #[tokio::test]
    async fn test_security_headers_are_added() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app(SecurityHeadersConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
        assert_eq!(
            response.headers().get("Strict-Transport-Security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("Referrer-Policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        assert_eq!(
            response.headers().get("Content-Security-Policy").unwrap(),
            "default-src 'none'; frame-ancestors 'none'"
        );
    }

    #[tokio::test]
    async fn test_headers_added_to_error_responses() {
        let request = Request::builder().uri("/fail").body(Body::empty()).unwrap();
        let response = app(SecurityHeadersConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get("X-Content-Type-Options").is_some());
        assert!(response.headers().get("Strict-Transport-Security").is_some());
    }

    #[tokio::test]
    async fn test_hsts_without_subdomains() {
        let cfg = SecurityHeadersConfig {
            hsts_max_age_secs: 600,
            hsts_include_subdomains: false,
        };
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app(cfg).oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("Strict-Transport-Security").unwrap(),
            "max-age=600"
        );
    }
}
