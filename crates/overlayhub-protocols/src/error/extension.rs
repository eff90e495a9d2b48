//! Extension-related errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension not found: {0}")]
    NotFound(String),

    #[error("Extension already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Extension contract invalid: {0}")]
    InvalidContract(String),

    #[error("Extension initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Extension wiring failed for {extension}: {reason}")]
    Wiring { extension: String, reason: String },

    #[error("Extension cleanup failed: {0}")]
    CleanupFailed(String),

    #[error("{0}")]
    Custom(String),
}
