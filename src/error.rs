//! Error types for the windowgate crate.

use thiserror::Error;

use crate::store::StoreError;

/// Main error type for windowgate operations.
#[derive(Error, Debug)]
pub enum WindowgateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Window store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for windowgate operations.
pub type Result<T> = std::result::Result<T, WindowgateError>;
