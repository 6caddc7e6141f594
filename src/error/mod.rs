//! Unified error handling for the token exchange function

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::federation::BrokerError;
use crate::provider::ValidationError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Message returned when the request carries no usable token
pub const NO_TOKEN_PROVIDED: &str = "No token provided";

/// Message returned when the request body cannot be parsed
pub const INVALID_REQUEST_FORMAT: &str = "Invalid request format";

/// Application error types
///
/// Every variant maps to a fixed status and a fixed client-facing message.
/// The inner strings are for logs only, except for `InvalidRequest` whose
/// message is already safe to return.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::UpstreamUnavailable(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::BrokerUnavailable(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidRequest(msg) => msg.clone(),
            AppError::Unauthenticated(_) | AppError::UpstreamUnavailable(_) => {
                "Invalid token".to_string()
            }
            AppError::BrokerUnavailable(_) => {
                "Failed to obtain authentication credentials".to_string()
            }
            AppError::Unexpected(_) => "Internal server error".to_string(),
        }
    }

    /// Label used for the `result` dimension of exchange metrics
    pub fn metric_label(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::BrokerUnavailable(_) => "broker_unavailable",
            AppError::Unexpected(_) => "unexpected",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidRequest(msg) => tracing::warn!("Rejected request: {}", msg),
            AppError::Unauthenticated(msg) => tracing::warn!("Token rejected: {}", msg),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Token provider unavailable: {}", msg)
            }
            AppError::BrokerUnavailable(msg) => {
                tracing::error!("Credential broker failed: {}", msg)
            }
            AppError::Unexpected(e) => tracing::error!("Unexpected error: {:?}", e),
        }

        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.public_message()));

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyToken => AppError::InvalidRequest(NO_TOKEN_PROVIDED.to_string()),
            ValidationError::Rejected { status } => {
                AppError::Unauthenticated(format!("provider returned status {}", status))
            }
            ValidationError::Transport(msg) | ValidationError::MalformedProfile(msg) => {
                AppError::UpstreamUnavailable(msg)
            }
        }
    }
}

impl From<BrokerError> for AppError {
    fn from(err: BrokerError) -> Self {
        AppError::BrokerUnavailable(err.to_string())
    }
}
