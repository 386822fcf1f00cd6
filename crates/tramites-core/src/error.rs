//! Error types for the Trámites core library.

use thiserror::Error;

/// Result type alias using the core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for domain operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A date field was not a valid `YYYY-MM-DD` value.
    #[error("Fecha inválida: {0}")]
    InvalidDate(String),

    /// A decision label was not part of the closed map for its kind.
    #[error("Decisión inválida: {0}")]
    InvalidDecision(String),
}
