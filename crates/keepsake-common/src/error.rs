//! Error types for Keepsake.

use thiserror::Error;

/// Result type alias using KeepsakeError.
pub type Result<T> = std::result::Result<T, KeepsakeError>;

/// Errors that can occur in Keepsake operations.
///
/// Index and catalog operations are infallible; a missing record is an
/// `Option`, not an error. These variants cover configuration loading.
#[derive(Debug, Error)]
pub enum KeepsakeError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },
}
