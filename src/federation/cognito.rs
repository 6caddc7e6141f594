//! Amazon Cognito Identity credential broker
//!
//! Uses developer-authenticated identities:
//! 1. `GetOpenIdTokenForDeveloperIdentity` maps `{provider_domain: user_id}`
//!    to a pool identity (created on first use, reused afterwards) and mints
//!    an OpenID token for it.
//! 2. `GetCredentialsForIdentity` trades that token for temporary AWS
//!    credentials scoped by the pool's authenticated role.

use super::broker::{BrokerError, CredentialBroker};
use crate::config::FederationConfig;
use crate::domain::FederatedCredentials;
use async_trait::async_trait;
use aws_sdk_cognitoidentity::{
    config::{retry::RetryConfig, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    primitives::DateTime,
    Client,
};

/// Login-map key for tokens minted by Cognito itself
pub const COGNITO_LOGIN_PROVIDER: &str = "cognito-identity.amazonaws.com";

/// Cognito Identity credential broker
#[derive(Clone)]
pub struct CognitoCredentialBroker {
    client: Client,
    identity_pool_id: String,
    provider_domain: String,
    token_duration_secs: i64,
}

impl CognitoCredentialBroker {
    /// Create a broker from configuration
    ///
    /// This is an async operation because the AWS SDK resolves region and
    /// credentials from the environment (the function's execution role).
    pub async fn from_config(config: &FederationConfig) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Self::new(Client::from_conf(client_config(&sdk_config, config)), config)
    }

    /// Create a broker around an already configured client
    pub fn new(client: Client, config: &FederationConfig) -> Self {
        Self {
            client,
            identity_pool_id: config.identity_pool_id.clone(),
            provider_domain: config.provider_domain.clone(),
            token_duration_secs: config.token_duration_secs,
        }
    }

    pub fn identity_pool_id(&self) -> &str {
        &self.identity_pool_id
    }

    async fn open_id_token(&self, external_user_id: &str) -> Result<(String, String), BrokerError> {
        let output = self
            .client
            .get_open_id_token_for_developer_identity()
            .identity_pool_id(&self.identity_pool_id)
            .logins(&self.provider_domain, external_user_id)
            .token_duration(self.token_duration_secs)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error_code = e.code().unwrap_or("unknown"),
                    "GetOpenIdTokenForDeveloperIdentity failed"
                );
                BrokerError::OpenIdToken(DisplayErrorContext(&e).to_string())
            })?;

        let identity_id = output
            .identity_id()
            .ok_or(BrokerError::MissingField("IdentityId"))?
            .to_string();
        let token = output
            .token()
            .ok_or(BrokerError::MissingField("Token"))?
            .to_string();

        Ok((identity_id, token))
    }
}

/// Service config for the Cognito client. SDK retries are disabled.
pub fn client_config(
    sdk_config: &aws_config::SdkConfig,
    federation: &FederationConfig,
) -> aws_sdk_cognitoidentity::Config {
    let mut builder = aws_sdk_cognitoidentity::config::Builder::from(sdk_config)
        .retry_config(RetryConfig::disabled());

    if let Some(endpoint) = &federation.endpoint_url {
        builder = builder.endpoint_url(endpoint);
    }

    builder.build()
}

fn to_utc(expiration: &DateTime) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos())
}

#[async_trait]
impl CredentialBroker for CognitoCredentialBroker {
    async fn issue(&self, external_user_id: &str) -> Result<FederatedCredentials, BrokerError> {
        if external_user_id.trim().is_empty() {
            return Err(BrokerError::EmptyUserId);
        }

        let (identity_id, identity_token) = self.open_id_token(external_user_id).await?;
        tracing::debug!(identity_id = %identity_id, "Obtained OpenID token for identity");

        let output = self
            .client
            .get_credentials_for_identity()
            .identity_id(&identity_id)
            .logins(COGNITO_LOGIN_PROVIDER, &identity_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error_code = e.code().unwrap_or("unknown"),
                    identity_id = %identity_id,
                    "GetCredentialsForIdentity failed"
                );
                BrokerError::Credentials(DisplayErrorContext(&e).to_string())
            })?;

        let credentials = output
            .credentials()
            .ok_or(BrokerError::MissingField("Credentials"))?;

        let expiration = credentials
            .expiration()
            .and_then(to_utc)
            .ok_or(BrokerError::MissingField("Expiration"))?;

        Ok(FederatedCredentials {
            identity_id,
            identity_token,
            access_key_id: credentials
                .access_key_id()
                .ok_or(BrokerError::MissingField("AccessKeyId"))?
                .to_string(),
            secret_key: credentials
                .secret_key()
                .ok_or(BrokerError::MissingField("SecretKey"))?
                .to_string(),
            session_token: credentials
                .session_token()
                .ok_or(BrokerError::MissingField("SessionToken"))?
                .to_string(),
            expiration,
        })
    }

    fn broker_name(&self) -> &'static str {
        "cognito"
    }
}
