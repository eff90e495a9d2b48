//! Connection hub errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    /// No peer is available to consume a command. Reported as a soft status.
    #[error("No consumer for '{action}': {reason}")]
    RoutingFailure { action: String, reason: String },

    /// A send to a dead or full transport. Counted, never surfaced per call.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Peer has not identified itself: {0}")]
    NotIdentified(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Handler error: {0}")]
    Handler(String),
}

impl HubError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoutingFailure { .. } => "NO_CONSUMER",
            Self::TransportFailure(_) => "TRANSPORT_FAILURE",
            Self::NotIdentified(_) => "NOT_IDENTIFIED",
            Self::InvalidMessage(_) => "INVALID_MESSAGE",
            Self::Handler(_) => "HANDLER_ERROR",
        }
    }
}
