//! Command middleware.
//!
//! Middleware runs after validation and before stamping, strictly in
//! registration order. Returning an error vetoes the command.

use std::collections::HashSet;
use tracing::debug;

use overlayhub_protocols::command::CommandContext;
use overlayhub_protocols::error::CommandError;
use overlayhub_protocols::types::Fields;

/// A command transform or gate.
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Transform the command, or reject it.
    fn apply(&self, command: Fields, context: &CommandContext) -> Result<Fields, CommandError>;
}

/// Logs every command passing through.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn apply(&self, command: Fields, context: &CommandContext) -> Result<Fields, CommandError> {
        debug!(
            source = %context.source,
            action = command.get("action").and_then(|a| a.as_str()).unwrap_or_default(),
            "Processing command"
        );
        Ok(command)
    }
}

/// Rejects actions on a blocklist.
pub struct SecurityMiddleware {
    blocked: HashSet<String>,
}

impl SecurityMiddleware {
    /// Actions blocked when nothing is configured.
    pub const DEFAULT_BLOCKLIST: [&'static str; 3] = ["eval", "script", "redirect"];

    pub fn new<I, S>(blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked: blocked.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_blocked(&self, action: &str) -> bool {
        self.blocked.contains(action)
    }
}

impl Default for SecurityMiddleware {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCKLIST)
    }
}

impl Middleware for SecurityMiddleware {
    fn name(&self) -> &str {
        "security"
    }

    fn apply(&self, command: Fields, _context: &CommandContext) -> Result<Fields, CommandError> {
        let action = command
            .get("action")
            .and_then(|a| a.as_str())
            .unwrap_or_default();
        if self.is_blocked(action) {
            return Err(CommandError::SecurityRejection {
                action: action.to_string(),
                reason: "action is on the security blocklist".to_string(),
            });
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(action: &str) -> Fields {
        match json!({"action": action}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_security_blocks_default_actions() {
        let security = SecurityMiddleware::default();
        let ctx = CommandContext::new("client_1");
        for action in ["eval", "script", "redirect"] {
            let err = security.apply(command(action), &ctx).unwrap_err();
            assert!(matches!(err, CommandError::SecurityRejection { .. }));
        }
        assert!(security.apply(command("circle"), &ctx).is_ok());
    }

    #[test]
    fn test_security_custom_blocklist() {
        let security = SecurityMiddleware::new(["navigate"]);
        let ctx = CommandContext::new("http");
        assert!(security.apply(command("navigate"), &ctx).is_err());
        assert!(security.apply(command("eval"), &ctx).is_ok());
    }

    #[test]
    fn test_logging_passes_through() {
        let ctx = CommandContext::new("client_1");
        let out = LoggingMiddleware.apply(command("hide"), &ctx).unwrap();
        assert_eq!(out, command("hide"));
        assert_eq!(LoggingMiddleware.name(), "logging");
    }
}
