//! Token exchange orchestration: validate the provider token, then broker credentials

use crate::domain::{AuthRequest, AuthResponse, ResponseShape};
use crate::error::Result;
use crate::federation::CredentialBroker;
use crate::provider::TokenValidator;
use metrics::histogram;
use std::sync::Arc;
use std::time::Instant;

/// Runs one exchange per request. Holds no per-request state.
pub struct TokenExchangeService {
    validator: Arc<dyn TokenValidator>,
    broker: Arc<dyn CredentialBroker>,
    shape: ResponseShape,
}

impl TokenExchangeService {
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        broker: Arc<dyn CredentialBroker>,
        shape: ResponseShape,
    ) -> Self {
        Self {
            validator,
            broker,
            shape,
        }
    }

    /// Validate the caller's token and exchange the resulting identity for
    /// federated credentials.
    ///
    /// The broker is only reached after the provider accepted the token.
    pub async fn exchange(&self, request: AuthRequest) -> Result<AuthResponse> {
        let token = request.into_token()?;

        let start = Instant::now();
        let validated = self.validator.validate(&token).await;
        histogram!(
            "audial_upstream_request_duration_seconds",
            "upstream" => self.validator.provider_name()
        )
        .record(start.elapsed().as_secs_f64());
        let profile = validated?;

        let start = Instant::now();
        let issued = self.broker.issue(&profile.id).await;
        histogram!(
            "audial_upstream_request_duration_seconds",
            "upstream" => self.broker.broker_name()
        )
        .record(start.elapsed().as_secs_f64());
        let credentials = issued?;

        tracing::info!(
            user_id = %profile.id,
            identity_id = %credentials.identity_id,
            "Successfully authenticated user"
        );

        Ok(AuthResponse::shaped(&profile, &credentials, self.shape))
    }
}
