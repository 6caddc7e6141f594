//! Third-party token provider integration
//!
//! A token is valid when the provider's profile endpoint accepts it. The
//! validator returns the profile so its `id` can be used as the federation key.

pub mod spotify;

pub use spotify::SpotifyTokenValidator;

use crate::domain::ExternalUserProfile;
use async_trait::async_trait;
use thiserror::Error;

/// Token validation error types
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No token provided")]
    EmptyToken,

    #[error("Provider rejected token with status {status}")]
    Rejected { status: u16 },

    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider returned a malformed profile: {0}")]
    MalformedProfile(String),
}

/// Trait for bearer-token validators
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate the token with a single upstream call and return the profile
    async fn validate(&self, token: &str) -> Result<ExternalUserProfile, ValidationError>;

    /// Provider name, for logs and metrics
    fn provider_name(&self) -> &'static str;
}
