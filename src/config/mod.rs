//! Configuration management for the token exchange function

use crate::domain::ResponseShape;
use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use std::env;
use std::str::FromStr;

/// Default Spotify Web API base URL
pub const DEFAULT_PROVIDER_API_URL: &str = "https://api.spotify.com";

/// Login-map key the external user id is registered under
pub const DEFAULT_PROVIDER_DOMAIN: &str = "accounts.spotify.com";

/// Upper bound Cognito accepts for `TokenDuration`
pub const MAX_TOKEN_DURATION_SECS: i64 = 86_400;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host (standalone mode)
    pub http_host: String,
    /// HTTP server port (standalone mode)
    pub http_port: u16,
    /// Where the router is served from
    pub run_mode: RunMode,
    /// Token provider configuration
    pub provider: ProviderConfig,
    /// Identity broker configuration
    pub federation: FederationConfig,
    /// Success response shape for this deployment
    pub response_shape: ResponseShape,
    pub cors: CorsConfig,
    pub security_headers: SecurityHeadersConfig,
    pub telemetry: TelemetryConfig,
}

/// Runtime surface for the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Behind API Gateway / function URLs via the Lambda runtime API
    Lambda,
    /// Plain TCP listener
    Http,
}

impl RunMode {
    /// Lambda when the runtime API is advertised, otherwise HTTP
    pub fn detect() -> Self {
        if env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
            RunMode::Lambda
        } else {
            RunMode::Http
        }
    }
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lambda" => Ok(RunMode::Lambda),
            "http" => Ok(RunMode::Http),
            other => bail!("Invalid RUN_MODE '{}', expected 'lambda' or 'http'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider API; the profile lives at `{api_url}/v1/me`
    pub api_url: String,
    /// Outbound request timeout
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PROVIDER_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FederationConfig {
    pub identity_pool_id: String,
    /// Region override; the SDK default chain applies when unset
    pub region: Option<String>,
    /// Endpoint override for local stacks and tests
    pub endpoint_url: Option<String>,
    /// Developer provider name used as the login-map key
    pub provider_domain: String,
    /// Lifetime requested for the OpenID token
    pub token_duration_secs: i64,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            identity_pool_id: String::new(),
            region: None,
            endpoint_url: None,
            provider_domain: DEFAULT_PROVIDER_DOMAIN.to_string(),
            token_duration_secs: 3600,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Disable when the hosting layer answers preflights itself
    pub enabled: bool,
    /// `*` or a single exact origin
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origin: "*".to_string(),
        }
    }
}

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub hsts_max_age_secs: u64,
    pub hsts_include_subdomains: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_max_age_secs: 31_536_000,
            hsts_include_subdomains: true,
        }
    }
}

/// Logging and metrics configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let run_mode = match env_opt("RUN_MODE") {
            Some(mode) => mode.parse()?,
            None => RunMode::detect(),
        };

        let default_log_format = match run_mode {
            RunMode::Lambda => "json",
            RunMode::Http => "pretty",
        };

        let config = Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            run_mode,
            provider: ProviderConfig {
                api_url: env::var("PROVIDER_API_URL")
                    .unwrap_or_else(|_| DEFAULT_PROVIDER_API_URL.to_string()),
                timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid PROVIDER_TIMEOUT_SECS")?,
            },
            federation: FederationConfig {
                identity_pool_id: env::var("COGNITO_IDENTITY_POOL_ID")
                    .context("COGNITO_IDENTITY_POOL_ID is required")?,
                region: env_opt("COGNITO_REGION"),
                endpoint_url: env_opt("COGNITO_ENDPOINT_URL"),
                provider_domain: env::var("FEDERATION_PROVIDER_DOMAIN")
                    .unwrap_or_else(|_| DEFAULT_PROVIDER_DOMAIN.to_string()),
                token_duration_secs: env::var("FEDERATION_TOKEN_DURATION_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .context("Invalid FEDERATION_TOKEN_DURATION_SECS")?,
            },
            response_shape: env::var("RESPONSE_SHAPE")
                .unwrap_or_else(|_| "token".to_string())
                .parse::<ResponseShape>()
                .map_err(anyhow::Error::msg)
                .context("Invalid RESPONSE_SHAPE")?,
            cors: CorsConfig {
                enabled: env_flag("CORS_ENABLED", true),
                allowed_origin: env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            },
            security_headers: SecurityHeadersConfig {
                hsts_max_age_secs: env::var("HSTS_MAX_AGE_SECS")
                    .unwrap_or_else(|_| "31536000".to_string())
                    .parse()
                    .context("Invalid HSTS_MAX_AGE_SECS")?,
                hsts_include_subdomains: env_flag("HSTS_INCLUDE_SUBDOMAINS", true),
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT")
                    .unwrap_or_else(|_| default_log_format.to_string())
                    .to_lowercase(),
                metrics_enabled: env_flag("METRICS_ENABLED", false),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, per request
    pub fn validate(&self) -> Result<()> {
        if self.federation.identity_pool_id.trim().is_empty() {
            bail!("COGNITO_IDENTITY_POOL_ID must not be empty");
        }

        if !(1..=MAX_TOKEN_DURATION_SECS).contains(&self.federation.token_duration_secs) {
            bail!(
                "FEDERATION_TOKEN_DURATION_SECS must be between 1 and {}",
                MAX_TOKEN_DURATION_SECS
            );
        }

        if self.federation.provider_domain.trim().is_empty() {
            bail!("FEDERATION_PROVIDER_DOMAIN must not be empty");
        }

        url::Url::parse(&self.provider.api_url).context("Invalid PROVIDER_API_URL")?;

        if let Some(endpoint) = &self.federation.endpoint_url {
            url::Url::parse(endpoint).context("Invalid COGNITO_ENDPOINT_URL")?;
        }

        if self.cors.allowed_origin != "*" {
            HeaderValue::from_str(&self.cors.allowed_origin)
                .context("Invalid CORS_ALLOWED_ORIGIN")?;
        }

        if !matches!(self.telemetry.log_format.as_str(), "json" | "pretty") {
            bail!(
                "Invalid LOG_FORMAT '{}', expected 'json' or 'pretty'",
                self.telemetry.log_format
            );
        }

        Ok(())
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
