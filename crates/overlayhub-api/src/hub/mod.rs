//! Connection hub.
//!
//! Tracks connected peers, learns their roles from the first
//! self-identification message and fans payloads out to them. Sends are
//! fire-and-forget: a closed or full outbound queue drops the payload and
//! bumps a counter.

mod delivery;

pub use delivery::Delivery;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use overlayhub_protocols::command::Command;
use overlayhub_protocols::peer::{PeerInfo, PeerRole, RoleFilter};

/// Default per-peer outbound queue length.
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

struct PeerHandle {
    info: PeerInfo,
    tx: mpsc::Sender<String>,
}

/// Peer table plus the primary-surface slot.
pub struct ConnectionHub {
    peers: DashMap<String, PeerHandle>,
    primary: RwLock<Option<String>>,
    dropped: AtomicU64,
    outbound_buffer: usize,
}

impl ConnectionHub {
    pub fn new(outbound_buffer: usize) -> Self {
        Self {
            peers: DashMap::new(),
            primary: RwLock::new(None),
            dropped: AtomicU64::new(0),
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    /// Accept a new connection. Returns its id and the receiving end of
    /// its outbound queue, which the transport drains.
    pub fn connect(&self) -> (String, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        let id = generate_client_id(Utc::now().timestamp_millis());
        self.register(id.clone(), tx);
        (id, rx)
    }

    /// Register a peer under a caller-chosen id, role unknown.
    pub fn register(&self, id: impl Into<String>, tx: mpsc::Sender<String>) {
        let id = id.into();
        info!("Peer connected: {}", id);
        self.peers.insert(
            id.clone(),
            PeerHandle {
                info: PeerInfo::new(id),
                tx,
            },
        );
    }

    /// Assign a role if the peer is still unknown.
    ///
    /// Returns true when this call classified the peer. A browser claims
    /// the primary slot, displacing any previous holder's bookkeeping.
    pub fn classify(&self, id: &str, role: PeerRole) -> bool {
        if role == PeerRole::Unknown {
            return false;
        }
        let Some(mut peer) = self.peers.get_mut(id) else {
            return false;
        };
        if peer.info.role != PeerRole::Unknown {
            debug!("Peer {} already classified as {}", id, peer.info.role);
            return false;
        }
        peer.info.role = role;
        drop(peer);

        if role.is_primary_surface() {
            let previous = self.primary.write().replace(id.to_string());
            if let Some(previous) = previous.filter(|p| p != id) {
                warn!("Primary surface {} pre-empted by {}", previous, id);
            }
        }
        info!("Peer {} identified as {}", id, role);
        true
    }

    /// Record activity on a peer.
    pub fn touch(&self, id: &str) {
        if let Some(mut peer) = self.peers.get_mut(id) {
            peer.info.last_activity = Utc::now();
        }
    }

    pub fn role(&self, id: &str) -> Option<PeerRole> {
        self.peers.get(id).map(|peer| peer.info.role)
    }

    pub fn peer(&self, id: &str) -> Option<PeerInfo> {
        self.peers.get(id).map(|peer| peer.info.clone())
    }

    /// Forget a peer. Frees the primary slot if it held it.
    pub fn disconnect(&self, id: &str) -> Option<PeerInfo> {
        let (_, handle) = self.peers.remove(id)?;
        {
            let mut primary = self.primary.write();
            if primary.as_deref() == Some(id) {
                *primary = None;
                info!("Primary surface disconnected: {}", id);
            }
        }
        info!("Peer disconnected: {} ({})", id, handle.info.role);
        Some(handle.info)
    }

    /// Best-effort send. False when the peer is gone or its queue is
    /// closed or full; the latter two count as dropped.
    pub fn send(&self, id: &str, payload: &Value) -> bool {
        match serde_json::to_string(payload) {
            Ok(text) => self.send_text(id, text),
            Err(e) => {
                warn!("Unserializable payload for {}: {}", id, e);
                false
            }
        }
    }

    fn send_text(&self, id: &str, text: String) -> bool {
        let Some(peer) = self.peers.get(id) else {
            return false;
        };
        match peer.tx.try_send(text) {
            Ok(()) => true,
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Dropped message to {}: {}", id, e);
                false
            }
        }
    }

    /// Send to every peer matching `filter`. Returns how many accepted it.
    pub fn broadcast(&self, payload: &Value, filter: RoleFilter) -> usize {
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                warn!("Unserializable broadcast payload: {}", e);
                return 0;
            }
        };
        let recipients: Vec<String> = self
            .peers
            .iter()
            .filter(|peer| filter.matches(peer.info.role))
            .map(|peer| peer.key().clone())
            .collect();

        recipients
            .into_iter()
            .filter(|id| self.send_text(id, text.clone()))
            .count()
    }

    /// Deliver a processed command to the peer role that consumes it.
    ///
    /// Peers holding the surface's role get it first; failing that the
    /// primary surface; failing that nobody.
    pub fn route(&self, command: &Command) -> Delivery {
        let payload = command.to_value();
        let surface = command.surface();

        if let Some(role) = PeerRole::for_surface(surface) {
            let holders = self
                .peers
                .iter()
                .filter(|peer| peer.info.role == role)
                .count();
            if holders > 0 {
                let recipients = self.broadcast(&payload, RoleFilter::Role(role));
                return Delivery::Delivered { role, recipients };
            }
        }

        if let Some(primary) = self.primary() {
            self.send(&primary, &payload);
            return Delivery::PrimarySurface { peer: primary };
        }

        let reason = match PeerRole::for_surface(surface) {
            Some(role) => format!("no {} peer and no primary surface connected", role),
            None => "no primary surface connected".to_string(),
        };
        Delivery::NoConsumer { reason }
    }

    /// Id of the peer holding the primary-surface slot.
    pub fn primary(&self) -> Option<String> {
        self.primary.read().clone()
    }

    pub fn has_primary(&self) -> bool {
        self.primary.read().is_some()
    }

    /// Snapshot of the peer table, oldest connection first.
    pub fn peers(&self) -> Vec<PeerInfo> {
        let mut peers: Vec<PeerInfo> = self.peers.iter().map(|peer| peer.info.clone()).collect();
        peers.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));
        peers
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Payloads dropped on closed or full transports.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOUND_BUFFER)
    }
}

/// `client_<millis>_<9 random chars>`.
pub fn generate_client_id(timestamp: i64) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("client_{}_{}", timestamp, &random[..9])
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
