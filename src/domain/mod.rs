//! Domain models for the token exchange function

pub mod auth;
pub mod identity;

pub use auth::*;
pub use identity::*;
