//! Audial Auth - provider token to federated credential exchange
//!
//! Validates a Spotify access token against the Web API and trades the
//! verified user id for Amazon Cognito Identity credentials. Runs under AWS
//! Lambda or as a standalone HTTP server.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod federation;
pub mod middleware;
pub mod provider;
pub mod server;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
