//! Authentication module for the Trámites server.
//!
//! Provides session token management and password hashing.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::Claims;
pub use token::TokenManager;
