//! Spotify Web API token validator
//!
//! Calls `GET /v1/me` with the caller's access token. Spotify answers 200
//! with the current user's profile for a live token and 401 otherwise.

use super::{TokenValidator, ValidationError};
use crate::config::ProviderConfig;
use crate::domain::ExternalUserProfile;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

/// Path of the current-user profile endpoint
pub const PROFILE_PATH: &str = "/v1/me";

/// Token validator backed by the Spotify Web API
#[derive(Clone)]
pub struct SpotifyTokenValidator {
    http_client: Client,
    profile_url: String,
}

impl SpotifyTokenValidator {
    /// Create a new validator from configuration
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create provider HTTP client")?;

        Ok(Self {
            http_client,
            profile_url: profile_url(&config.api_url),
        })
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }
}

fn profile_url(api_url: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), PROFILE_PATH)
}

#[async_trait]
impl TokenValidator for SpotifyTokenValidator {
    async fn validate(&self, token: &str) -> Result<ExternalUserProfile, ValidationError> {
        if token.is_empty() {
            return Err(ValidationError::EmptyToken);
        }

        let response = self
            .http_client
            .get(&self.profile_url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    "Spotify profile request failed"
                );
                ValidationError::Transport(e.without_url().to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                status = status.as_u16(),
                "Spotify token validation failed"
            );
            return Err(ValidationError::Rejected {
                status: status.as_u16(),
            });
        }

        let profile: ExternalUserProfile = response
            .json()
            .await
            .map_err(|e| ValidationError::MalformedProfile(e.without_url().to_string()))?;

        if profile.id.trim().is_empty() {
            return Err(ValidationError::MalformedProfile(
                "profile id is empty".to_string(),
            ));
        }

        Ok(profile)
    }

    fn provider_name(&self) -> &'static str {
        "spotify"
    }
}
