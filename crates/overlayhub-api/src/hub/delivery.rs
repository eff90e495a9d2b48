//! Outcome of routing one command.

use serde::Serialize;

use overlayhub_protocols::error::HubError;
use overlayhub_protocols::peer::PeerRole;

/// Where a routed command went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    /// Sent to every peer holding the surface's role.
    Delivered { role: PeerRole, recipients: usize },
    /// No role holder; handed to the primary surface.
    PrimarySurface { peer: String },
    /// Nobody to hand it to. A soft failure.
    NoConsumer { reason: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::NoConsumer { .. })
    }

    /// The routing failure this delivery represents, if any.
    pub fn failure(&self, action: &str) -> Option<HubError> {
        match self {
            Self::NoConsumer { reason } => Some(HubError::RoutingFailure {
                action: action.to_string(),
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}
