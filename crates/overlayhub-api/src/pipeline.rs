//! The path every command takes, whoever submitted it.
//!
//! `command_received` hook → processor → routing → surface hook →
//! `command_executed` hook.

use serde_json::{json, Value};
use tracing::{debug, warn};

use overlayhub_protocols::command::{Command, CommandContext, Surface};
use overlayhub_protocols::error::CommandError;
use overlayhub_protocols::hook::names;

use crate::hub::Delivery;
use crate::state::AppState;

/// A command that made it through processing, and where it went.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub command: Command,
    pub delivery: Delivery,
}

impl Accepted {
    /// `command_accepted` reply for the submitting peer.
    pub fn to_reply(&self) -> Value {
        json!({
            "type": "command_accepted",
            "id": self.command.id,
            "action": self.command.action(),
            "delivery": self.delivery,
        })
    }
}

/// `command_rejected` reply for the submitting peer.
pub fn rejection_reply(error: &CommandError) -> Value {
    json!({
        "type": "command_rejected",
        "code": error.code(),
        "errors": error.messages(),
    })
}

/// Process and route one raw command.
pub async fn submit_command(
    state: &AppState,
    raw: Value,
    context: &CommandContext,
) -> Result<Accepted, CommandError> {
    let raw = state.hooks.fire(names::COMMAND_RECEIVED, raw).await;

    let command = match state.processor.process(raw, context) {
        Ok(command) => command,
        Err(e) => {
            debug!("Command from {} rejected: {}", context.source, e);
            report_error(state, e.code(), &e.to_string(), &context.source).await;
            return Err(e);
        }
    };

    let delivery = state.hub.route(&command);
    if let Some(failure) = delivery.failure(command.action()) {
        warn!("{}", failure);
    }

    let event = json!({
        "command": command.to_value(),
        "delivery": delivery,
        "source": context.source,
    });
    if delivery.is_delivered() {
        match command.surface() {
            Surface::Overlay => {
                state.hooks.fire(names::OVERLAY_DRAW, event.clone()).await;
            }
            Surface::Dom => {
                state.hooks.fire(names::DOM_MANIPULATION, event.clone()).await;
            }
            Surface::Shell | Surface::Any => {}
        }
    }
    state.hooks.fire(names::COMMAND_EXECUTED, event).await;

    Ok(Accepted { command, delivery })
}

/// Fire `error_occurred`.
pub async fn report_error(state: &AppState, kind: &str, message: &str, peer: &str) {
    state
        .hooks
        .fire(
            names::ERROR_OCCURRED,
            json!({"kind": kind, "message": message, "peer": peer}),
        )
        .await;
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
