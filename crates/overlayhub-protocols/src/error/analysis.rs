//! Analysis provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Unsupported analysis kind: {0}")]
    Unsupported(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
