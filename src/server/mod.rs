//! Server initialization and routing

use crate::api;
use crate::config::{Config, CorsConfig, RunMode};
use crate::error::AppError;
use crate::federation::{CognitoCredentialBroker, CredentialBroker};
use crate::middleware::{
    normalize_error_response, security_headers_middleware, ObservabilityLayer, SanitizedMakeSpan,
};
use crate::provider::{SpotifyTokenValidator, TokenValidator};
use crate::service::TokenExchangeService;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Token payloads are small; anything larger is rejected with 413
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub exchange_service: Arc<TokenExchangeService>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Config,
        validator: Arc<dyn TokenValidator>,
        broker: Arc<dyn CredentialBroker>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let exchange_service = TokenExchangeService::new(validator, broker, config.response_shape);

        Self {
            config: Arc::new(config),
            exchange_service: Arc::new(exchange_service),
            metrics_handle,
        }
    }

    /// Build the production clients once, at cold start
    pub async fn from_config(
        config: Config,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Result<Self> {
        let validator = SpotifyTokenValidator::new(&config.provider)?;
        info!(profile_url = %validator.profile_url(), "Token validator ready");

        let broker = CognitoCredentialBroker::from_config(&config.federation).await;
        info!(
            identity_pool_id = %broker.identity_pool_id(),
            "Credential broker ready"
        );

        Ok(Self::new(
            config,
            Arc::new(validator),
            Arc::new(broker),
            metrics_handle,
        ))
    }
}

/// Run the router on the configured surface
pub async fn run(config: Config, metrics_handle: Option<PrometheusHandle>) -> Result<()> {
    let run_mode = config.run_mode;
    let http_addr = config.http_addr();

    let state = AppState::from_config(config, metrics_handle).await?;
    let app = build_router(state);

    match run_mode {
        RunMode::Lambda => {
            info!("Starting Lambda runtime");
            lambda_http::run(app)
                .await
                .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))?;
        }
        RunMode::Http => {
            let listener = TcpListener::bind(&http_addr).await?;
            info!("HTTP server started on {}", http_addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Build the HTTP router
///
/// Layers, innermost first: body limit, error normalization, panic recovery,
/// CORS, tracing, request ID + metrics, security headers. Security headers are outermost so
/// they land on every response, including CORS preflights and 404s.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route(
            "/validate-token",
            post(api::auth::validate_token).options(api::auth::preflight),
        )
        .route(
            "/",
            post(api::auth::validate_token).options(api::auth::preflight),
        )
        .route("/health", get(api::health::health));

    if state.metrics_handle.is_some() {
        router = router.route("/metrics", get(api::metrics::metrics_handler));
    }

    let mut router = router
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(normalize_error_response))
        .layer(CatchPanicLayer::custom(handle_panic));

    if config.cors.enabled {
        router = router.layer(cors_layer(&config.cors));
    }

    router
        .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
        .layer(ObservabilityLayer)
        .layer(axum::middleware::from_fn_with_state(
            config.security_headers.clone(),
            security_headers_middleware,
        ))
        .with_state(state)
}

/// A panicking handler still answers 500 with the generic error body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Unexpected(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(&config.allowed_origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin, cross-origin requests will fail");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::OPTIONS, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-amz-date"),
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
        ])
}
