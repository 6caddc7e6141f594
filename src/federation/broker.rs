//! Credential broker trait and error types

use crate::domain::FederatedCredentials;
use async_trait::async_trait;
use thiserror::Error;

/// Credential broker error types
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("External user id is empty")]
    EmptyUserId,

    #[error("OpenID token request failed: {0}")]
    OpenIdToken(String),

    #[error("Credentials request failed: {0}")]
    Credentials(String),

    #[error("Broker response is missing {0}")]
    MissingField(&'static str),
}

/// Trait for federated identity brokers
///
/// Implementations must not retry: a failed call ends the request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Map the external user to a broker identity and issue temporary credentials
    async fn issue(&self, external_user_id: &str) -> Result<FederatedCredentials, BrokerError>;

    /// Get the broker name
    fn broker_name(&self) -> &'static str;
}
