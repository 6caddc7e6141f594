//! External identity and federated credential models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Profile returned by the provider's "who am I" endpoint
///
/// Only the fields the exchange needs are kept; everything else in the
/// provider payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalUserProfile {
    /// Stable provider user id, used as the federation key
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Temporary credentials issued by the identity broker for one identity
#[derive(Clone, PartialEq)]
pub struct FederatedCredentials {
    pub identity_id: String,
    /// OpenID token minted for the identity (the "cognito token")
    pub identity_token: String,
    pub access_key_id: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl FederatedCredentials {
    /// The AWS key material in the shape returned to callers
    pub fn temporary_credentials(&self) -> TemporaryCredentials {
        TemporaryCredentials {
            access_key_id: self.access_key_id.clone(),
            secret_key: self.secret_key.clone(),
            session_token: self.session_token.clone(),
            expiration: self.expiration,
        }
    }
}

impl fmt::Debug for FederatedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedCredentials")
            .field("identity_id", &self.identity_id)
            .field("identity_token", &"[REDACTED]")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Access key, secret and session token with their expiry
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}
