//! Token exchange endpoint

use crate::domain::{AuthRequest, AuthResponse};
use crate::error::Result;
use crate::server::AppState;
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use metrics::counter;
use serde_json::json;

/// POST /validate-token
///
/// The body is read raw so that an absent body, invalid JSON and a missing
/// token each map to their own 400 message.
pub async fn validate_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthResponse>> {
    let result = exchange(&state, &body).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.metric_label(),
    };
    counter!("audial_token_exchange_total", "result" => outcome).increment(1);

    result.map(Json)
}

async fn exchange(state: &AppState, body: &[u8]) -> Result<AuthResponse> {
    let request = AuthRequest::from_body(body)?;
    state.exchange_service.exchange(request).await
}

/// OPTIONS without CORS preflight headers
pub async fn preflight() -> impl IntoResponse {
    Json(json!({}))
}
