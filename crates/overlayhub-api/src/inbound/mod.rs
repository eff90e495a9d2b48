//! Inbound message dispatch.
//!
//! Every peer message is a JSON object carrying either a `type` (lifecycle,
//! identification, analysis traffic) or an `action` (a command). Typed
//! messages go to the handler registered for that type; commands go
//! through the command pipeline.

mod handlers;

pub use handlers::{
    DomDataHandler, DomReportHandler, IdentifyHandler, PageNavigatedHandler, PingHandler,
    RequestAnalysisHandler, ScreenshotHandler, VoiceCommandHandler, DOM_REPORT_TYPES,
};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use overlayhub_protocols::command::CommandContext;
use overlayhub_protocols::error::HubError;
use overlayhub_protocols::peer::PeerRole;

use crate::pipeline::{rejection_reply, report_error, submit_command};
use crate::state::AppState;

/// Handles one `type` of inbound message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError>;
}

/// Message type → handler.
pub struct MessageHandlers {
    handlers: DashMap<String, Arc<dyn MessageHandler>>,
}

impl MessageHandlers {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Registry with a handler for every message type the hub understands.
    pub fn with_builtin() -> Self {
        let handlers = Self::new();
        let identify: Arc<dyn MessageHandler> = Arc::new(IdentifyHandler);
        for marker in [
            "browser_ready",
            "control_ready",
            "agent_ready",
            "overlay_ready",
            "dom_surface_ready",
        ] {
            handlers.register(marker, identify.clone());
        }
        handlers.register("ping", Arc::new(PingHandler));
        handlers.register("screenshot", Arc::new(ScreenshotHandler));
        handlers.register("dom_data", Arc::new(DomDataHandler));
        handlers.register("page_navigated", Arc::new(PageNavigatedHandler));
        handlers.register("request_analysis", Arc::new(RequestAnalysisHandler));
        handlers.register("voice_command", Arc::new(VoiceCommandHandler));
        let report: Arc<dyn MessageHandler> = Arc::new(DomReportHandler);
        for kind in DOM_REPORT_TYPES {
            handlers.register(kind, report.clone());
        }
        handlers
    }

    /// Add or replace the handler for a message type.
    pub fn register(&self, message_type: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        self.handlers.insert(message_type.into(), handler);
    }

    pub fn get(&self, message_type: &str) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.get(message_type).map(|h| h.value().clone())
    }

    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.iter().map(|h| h.key().clone()).collect();
        types.sort();
        types
    }
}

impl Default for MessageHandlers {
    fn default() -> Self {
        Self::new()
    }
}

fn error_reply(error: &HubError) -> Value {
    json!({
        "type": "error",
        "code": error.code(),
        "message": error.to_string(),
    })
}

/// Handle one text frame from `peer`.
///
/// Never fails: problems are answered with an `error` message and
/// reported on the `error_occurred` hook.
pub async fn dispatch(state: &AppState, peer: &str, text: &str) {
    let message = match serde_json::from_str::<Value>(text) {
        Ok(message @ Value::Object(_)) => message,
        Ok(_) => {
            reject(state, peer, HubError::InvalidMessage("expected a JSON object".into())).await;
            return;
        }
        Err(e) => {
            reject(state, peer, HubError::InvalidMessage(e.to_string())).await;
            return;
        }
    };

    state.hub.touch(peer);

    let message_type = message.get("type").and_then(Value::as_str).map(str::to_string);
    if let Some(role) = message_type.as_deref().and_then(PeerRole::from_identification) {
        state.hub.classify(peer, role);
    }

    match message_type {
        Some(message_type) => dispatch_typed(state, peer, &message_type, message).await,
        None if message.get("action").is_some() => dispatch_command(state, peer, message).await,
        None => {
            reject(
                state,
                peer,
                HubError::InvalidMessage("message needs a type or an action".into()),
            )
            .await;
        }
    }
}

async fn dispatch_typed(state: &AppState, peer: &str, message_type: &str, message: Value) {
    let Some(handler) = state.handlers.get(message_type) else {
        debug!("Ignoring message of type {} from {}", message_type, peer);
        return;
    };
    if let Err(e) = handler.handle(state, peer, message).await {
        warn!("Handler for {} failed for {}: {}", message_type, peer, e);
        reject(state, peer, e).await;
    }
}

async fn dispatch_command(state: &AppState, peer: &str, message: Value) {
    let role = state.hub.role(peer).unwrap_or(PeerRole::Unknown);
    if role == PeerRole::Unknown && state.settings.require_identification {
        reject(
            state,
            peer,
            HubError::NotIdentified(format!("{} must identify before sending commands", peer)),
        )
        .await;
        return;
    }

    let context = CommandContext::new(peer)
        .with_role(role)
        .with_metadata("transport", "ws");
    let reply = match submit_command(state, message, &context).await {
        Ok(accepted) => accepted.to_reply(),
        Err(e) => rejection_reply(&e),
    };
    state.hub.send(peer, &reply);
}

async fn reject(state: &AppState, peer: &str, error: HubError) {
    state.hub.send(peer, &error_reply(&error));
    report_error(state, error.code(), &error.to_string(), peer).await;
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
