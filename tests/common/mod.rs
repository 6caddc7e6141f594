//! Shared test infrastructure
//!
//! - `MockProviderServer` - wiremock stand-in for the Spotify Web API
//! - `MockCognitoServer` - wiremock stand-in for Cognito Identity (awsJson1_1)
//! - `build_test_router` - the production router wired to both mocks
//! - `get_json` / `post_json` / `send` request helpers

#![allow(dead_code)]

use audial_auth::config::{
    Config, CorsConfig, FederationConfig, ProviderConfig, RunMode, SecurityHeadersConfig,
    TelemetryConfig,
};
use audial_auth::domain::ResponseShape;
use audial_auth::federation::cognito::client_config;
use audial_auth::federation::CognitoCredentialBroker;
use audial_auth::provider::SpotifyTokenValidator;
use audial_auth::server::{build_router, AppState};
use aws_sdk_cognitoidentity::config::{BehaviorVersion, Credentials, Region};
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_POOL_ID: &str = "us-east-1:00000000-0000-0000-0000-000000000000";
pub const OPEN_ID_TARGET: &str = "AWSCognitoIdentityService.GetOpenIdTokenForDeveloperIdentity";
pub const CREDENTIALS_TARGET: &str = "AWSCognitoIdentityService.GetCredentialsForIdentity";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

// ============================================================================
// Mock Spotify Web API
// ============================================================================

pub struct MockProviderServer {
    server: MockServer,
}

impl MockProviderServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// `GET /v1/me` answers 200 with `profile` for `token`
    pub async fn mock_profile(&self, token: &str, profile: Value) {
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile))
            .mount(&self.server)
            .await;
    }

    /// `GET /v1/me` answers `status` with Spotify's error envelope
    pub async fn mock_rejection(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"status": status, "message": "The access token expired"}
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Fails the test on drop if the provider is called at all
    pub async fn expect_no_calls(&self) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

// ============================================================================
// Mock Cognito Identity
// ============================================================================

pub struct MockCognitoServer {
    server: MockServer,
}

impl MockCognitoServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Both calls succeed; the identity id is derived from the user id
    pub async fn mock_success(&self, user_id: &str) {
        self.mock_open_id_token(user_id).await;
        self.mock_credentials(user_id).await;
    }

    pub async fn mock_open_id_token(&self, user_id: &str) {
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", OPEN_ID_TARGET))
            .and(body_partial_json(json!({
                "IdentityPoolId": TEST_POOL_ID,
                "Logins": {"accounts.spotify.com": user_id},
                "TokenDuration": 3600
            })))
            .respond_with(amz_json(
                200,
                json!({
                    "IdentityId": identity_id_for(user_id),
                    "Token": open_id_token_for(user_id)
                }),
            ))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_credentials(&self, user_id: &str) {
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", CREDENTIALS_TARGET))
            .and(body_partial_json(json!({
                "IdentityId": identity_id_for(user_id),
                "Logins": {"cognito-identity.amazonaws.com": open_id_token_for(user_id)}
            })))
            .respond_with(amz_json(
                200,
                json!({
                    "IdentityId": identity_id_for(user_id),
                    "Credentials": {
                        "AccessKeyId": "ASIATESTACCESSKEY",
                        "SecretKey": "test-secret-key",
                        "SessionToken": "test-session-token",
                        "Expiration": 1893456000
                    }
                }),
            ))
            .mount(&self.server)
            .await;
    }

    /// Every call fails with a modeled service error
    pub async fn mock_failure(&self, error_type: &str) {
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(amz_json(
                400,
                json!({"__type": error_type, "message": "Identity pool not found"}),
            ))
            .mount(&self.server)
            .await;
    }

    /// Fails the test on drop if Cognito is called at all
    pub async fn expect_no_calls(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

fn amz_json(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), AMZ_JSON)
}

pub fn identity_id_for(user_id: &str) -> String {
    format!("us-east-1:identity-{}", user_id)
}

pub fn open_id_token_for(user_id: &str) -> String {
    format!("open-id-{}", user_id)
}

// ============================================================================
// Test Configuration
// ============================================================================

pub fn create_test_config(provider_url: &str, cognito_url: &str) -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        run_mode: RunMode::Http,
        provider: ProviderConfig {
            api_url: provider_url.to_string(),
            timeout_secs: 5,
        },
        federation: FederationConfig {
            identity_pool_id: TEST_POOL_ID.to_string(),
            region: Some("us-east-1".to_string()),
            endpoint_url: Some(cognito_url.to_string()),
            ..FederationConfig::default()
        },
        response_shape: ResponseShape::Token,
        cors: CorsConfig::default(),
        security_headers: SecurityHeadersConfig::default(),
        telemetry: TelemetryConfig::default(),
    }
}

/// Cognito broker signing with static test credentials
pub async fn create_test_broker(federation: &FederationConfig) -> CognitoCredentialBroker {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new(
            "AKIDTEST",
            "test-secret",
            None,
            None,
            "test",
        ))
        .load()
        .await;

    let client = aws_sdk_cognitoidentity::Client::from_conf(client_config(&sdk_config, federation));
    CognitoCredentialBroker::new(client, federation)
}

// ============================================================================
// Test Router Builder
// ============================================================================

/// Production router backed by the real validator and broker, pointed at mocks
pub async fn build_test_router(config: Config) -> Router {
    let validator = SpotifyTokenValidator::new(&config.provider).unwrap();
    let broker = create_test_broker(&config.federation).await;

    build_router(AppState::new(
        config,
        Arc::new(validator),
        Arc::new(broker),
        None,
    ))
}

// ============================================================================
// HTTP Test Helpers
// ============================================================================

/// Send a raw request and return status, headers and the JSON body (if any)
pub async fn send(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, HeaderMap, Option<Value>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    if body_bytes.is_empty() {
        return (status, headers, None);
    }

    (status, headers, serde_json::from_slice(&body_bytes).ok())
}

/// Make a POST request with a raw body
pub async fn post_raw(
    app: &Router,
    path: &str,
    body: impl Into<Body>,
) -> (StatusCode, HeaderMap, Option<Value>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap();

    send(app, request).await
}

/// Make a GET request and parse JSON response
pub async fn get_json<T: DeserializeOwned>(app: &Router, path: &str) -> (StatusCode, Option<T>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(app, request).await;
    (status, body.and_then(|v| serde_json::from_value(v).ok()))
}

/// Make a POST request with JSON body and parse JSON response
pub async fn post_json<T: Serialize, R: DeserializeOwned>(
    app: &Router,
    path: &str,
    body: &T,
) -> (StatusCode, Option<R>) {
    let (status, _, body) = post_raw(app, path, serde_json::to_string(body).unwrap()).await;
    (status, body.and_then(|v| serde_json::from_value(v).ok()))
}
