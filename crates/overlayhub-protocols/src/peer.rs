//! Peer protocol definitions.
//!
//! A peer is one transport connection to the hub. Its role is learned from
//! the first self-identification message it sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::Surface;

/// Classified function of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    /// Not yet identified.
    Unknown,
    /// The controlled browser shell. At most one peer holds the primary slot.
    Browser,
    /// Control panel / observer.
    Control,
    /// An analysis agent submitting commands.
    Agent,
    /// A dedicated overlay renderer.
    Overlay,
    /// A dedicated DOM manipulator.
    Dom,
}

impl PeerRole {
    /// Role declared by a self-identification message type, if any.
    pub fn from_identification(message_type: &str) -> Option<Self> {
        match message_type {
            "browser_ready" => Some(Self::Browser),
            "control_ready" => Some(Self::Control),
            "agent_ready" => Some(Self::Agent),
            "overlay_ready" => Some(Self::Overlay),
            "dom_surface_ready" => Some(Self::Dom),
            _ => None,
        }
    }

    /// The role preferred for commands aimed at `surface`.
    pub fn for_surface(surface: Surface) -> Option<Self> {
        match surface {
            Surface::Overlay => Some(Self::Overlay),
            Surface::Dom => Some(Self::Dom),
            Surface::Shell => Some(Self::Browser),
            Surface::Any => None,
        }
    }

    /// Whether this role claims the primary-surface slot.
    pub fn is_primary_surface(&self) -> bool {
        matches!(self, Self::Browser)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Browser => "browser",
            Self::Control => "control",
            Self::Agent => "agent",
            Self::Overlay => "overlay",
            Self::Dom => "dom",
        }
    }
}

impl std::fmt::Display for PeerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient filter for broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    All,
    Role(PeerRole),
}

impl RoleFilter {
    pub fn matches(&self, role: PeerRole) -> bool {
        match self {
            Self::All => true,
            Self::Role(wanted) => *wanted == role,
        }
    }
}

impl From<PeerRole> for RoleFilter {
    fn from(role: PeerRole) -> Self {
        Self::Role(role)
    }
}

/// Bookkeeping for one connected peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: String,
    pub role: PeerRole,
    pub connected_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl PeerInfo {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            role: PeerRole::Unknown,
            connected_at: now,
            last_activity: now,
        }
    }
}
