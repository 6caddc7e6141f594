//! Federated identity broker
//!
//! Trades a verified external user id for temporary cloud credentials.

pub mod broker;
pub mod cognito;

pub use broker::{BrokerError, CredentialBroker};
pub use cognito::CognitoCredentialBroker;
