//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Join timed out or the session platform is unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// A destination number is missing or blank
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The platform rejected the call redirect
    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other failure reported by the session platform
    #[error("Platform error: {0}")]
    Platform(String),
}
