//! Request and response models for the token exchange endpoint

use super::identity::{ExternalUserProfile, FederatedCredentials, TemporaryCredentials};
use crate::error::{AppError, Result, INVALID_REQUEST_FORMAT, NO_TOKEN_PROVIDED};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Inbound exchange request: `{"token": "<provider access token>"}`
#[derive(Default, Clone, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(required, length(min = 1))]
    pub token: Option<String>,
}

impl AuthRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Parse a raw request body.
    ///
    /// An absent or blank body is treated as `{}`. Anything that is not a
    /// JSON object is a format error.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| AppError::InvalidRequest(INVALID_REQUEST_FORMAT.to_string()))?;

        if !value.is_object() {
            return Err(AppError::InvalidRequest(INVALID_REQUEST_FORMAT.to_string()));
        }

        serde_json::from_value(value)
            .map_err(|_| AppError::InvalidRequest(INVALID_REQUEST_FORMAT.to_string()))
    }

    /// Consume the request, returning the token if it is present and non-empty
    pub fn into_token(self) -> Result<String> {
        self.validate()
            .map_err(|_| AppError::InvalidRequest(NO_TOKEN_PROVIDED.to_string()))?;

        self.token
            .ok_or_else(|| AppError::InvalidRequest(NO_TOKEN_PROVIDED.to_string()))
    }
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Which fields a deployment returns on success
///
/// `userId` and `identityId` are always present. The caller's bearer token
/// is never echoed back in either shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseShape {
    /// `userId`, `identityId`, `cognitoToken`
    #[default]
    Token,
    /// Everything in `Token` plus `email` and the temporary `credentials`
    Credentials,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Token => "token",
            ResponseShape::Credentials => "credentials",
        }
    }
}

impl FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(ResponseShape::Token),
            "credentials" | "full" => Ok(ResponseShape::Credentials),
            other => Err(format!("unknown response shape '{}'", other)),
        }
    }
}

/// Successful exchange response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: String,
    pub identity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<TemporaryCredentials>,
}

impl AuthResponse {
    pub fn shaped(
        profile: &ExternalUserProfile,
        credentials: &FederatedCredentials,
        shape: ResponseShape,
    ) -> Self {
        let mut response = Self {
            user_id: profile.id.clone(),
            identity_id: credentials.identity_id.clone(),
            cognito_token: Some(credentials.identity_token.clone()),
            email: None,
            credentials: None,
        };

        if shape == ResponseShape::Credentials {
            response.email = profile.email.clone();
            response.credentials = Some(credentials.temporary_credentials());
        }

        response
    }
}
