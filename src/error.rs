//! Crate error types
//!
//! Error types for gateway operations. Local degradation (unknown keys,
//! malformed metadata) is modelled as outcome enums on the relevant
//! operations, not as errors.

/// Error type for gateway operations
#[derive(Debug, Clone)]
pub enum Error {
    /// Invalid or missing configuration
    Config(String),
    /// External platform call failed
    Platform(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Platform(msg) => write!(f, "Platform error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;
