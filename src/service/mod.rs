//! Business logic layer

pub mod token_exchange;

pub use token_exchange::TokenExchangeService;
