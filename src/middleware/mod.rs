//! HTTP middleware
//!
//! - Security headers on every response
//! - JSON normalization of framework-level error responses
//! - Request ID propagation and HTTP metrics
//! - Trace spans with sensitive query values redacted

pub mod error_response;
pub mod metrics;
pub mod security_headers;
pub mod trace;

pub use error_response::normalize_error_response;
pub use metrics::ObservabilityLayer;
pub use security_headers::security_headers_middleware;
pub use trace::SanitizedMakeSpan;
