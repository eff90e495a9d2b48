//! Command processing errors.

use thiserror::Error;

/// Errors raised while turning a raw command into a stamped one.
#[derive(Debug, Error)]
pub enum CommandError {
    /// One or more fields failed schema validation.
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// A middleware vetoed the command.
    #[error("Command '{action}' rejected: {reason}")]
    SecurityRejection { action: String, reason: String },

    /// The payload is not a command at all (not an object, no action).
    #[error("Malformed command: {0}")]
    Malformed(String),
}

impl CommandError {
    /// Short machine-readable code reported back to peers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::SecurityRejection { .. } => "SECURITY_REJECTION",
            Self::Malformed(_) => "MALFORMED_COMMAND",
        }
    }

    /// Individual error messages, one per failing field where applicable.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}
