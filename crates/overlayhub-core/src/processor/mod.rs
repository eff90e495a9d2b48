//! Command processor.
//!
//! Turns a raw JSON command into a stamped [`Command`]: validate, fill
//! defaults, run middleware, stamp `timestamp`/`id`, record in history.
//! Delivery is someone else's job.

mod history;
mod middleware;

pub use history::{CommandHistory, DEFAULT_HIGH_WATER, DEFAULT_RETAIN};
pub use middleware::{LoggingMiddleware, Middleware, SecurityMiddleware};

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, warn};

use overlayhub_protocols::command::{Command, CommandContext, HistoryEntry};
use overlayhub_protocols::error::CommandError;

use crate::schema::SchemaRegistry;

/// Validates, transforms, stamps and records commands.
pub struct CommandProcessor {
    schemas: Arc<SchemaRegistry>,
    middleware: RwLock<Vec<Arc<dyn Middleware>>>,
    history: CommandHistory,
    last_timestamp: AtomicI64,
}

impl CommandProcessor {
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self::with_history(schemas, CommandHistory::default())
    }

    pub fn with_history(schemas: Arc<SchemaRegistry>, history: CommandHistory) -> Self {
        Self {
            schemas,
            middleware: RwLock::new(Vec::new()),
            history,
            last_timestamp: AtomicI64::new(0),
        }
    }

    /// Append a middleware; it runs after every one added before it.
    pub fn add_middleware(&self, middleware: Arc<dyn Middleware>) {
        debug!("Adding command middleware: {}", middleware.name());
        self.middleware.write().push(middleware);
    }

    pub fn middleware_names(&self) -> Vec<String> {
        self.middleware
            .read()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Process one raw command.
    ///
    /// Nothing is recorded unless every step succeeds. An already stamped
    /// command keeps its `id` and `timestamp`.
    pub fn process(&self, raw: Value, context: &CommandContext) -> Result<Command, CommandError> {
        let Value::Object(mut fields) = raw else {
            return Err(CommandError::Malformed(
                "command must be a JSON object".to_string(),
            ));
        };

        let validation = self.schemas.validate(&fields);
        if !validation.valid {
            return Err(CommandError::Validation {
                errors: validation.errors,
            });
        }
        for warning in &validation.warnings {
            warn!("Command from {}: {}", context.source, warning);
        }

        self.schemas.apply_defaults(&mut fields);

        let chain: Vec<Arc<dyn Middleware>> = self.middleware.read().clone();
        for middleware in chain {
            fields = middleware.apply(fields, context)?;
        }

        if !fields.get("action").is_some_and(Value::is_string) {
            return Err(CommandError::Malformed(
                "middleware removed the action".to_string(),
            ));
        }

        if fields.get("timestamp").is_none_or(Value::is_null) {
            fields.insert("timestamp".to_string(), Value::from(self.next_timestamp()));
        }
        if fields.get("id").is_none_or(Value::is_null) {
            let timestamp = fields
                .get("timestamp")
                .and_then(Value::as_i64)
                .unwrap_or_else(|| Utc::now().timestamp_millis());
            fields.insert("id".to_string(), Value::String(generate_id(timestamp)));
        }

        let command = Command::from_fields(fields).ok_or_else(|| {
            CommandError::Malformed("timestamp must be an integer".to_string())
        })?;

        self.history.push(HistoryEntry {
            command: command.clone(),
            validation,
            context: context.clone(),
            recorded_at: Utc::now(),
        });

        Ok(command)
    }

    /// Wall-clock milliseconds, never lower than a previous stamp.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self.last_timestamp.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

/// `cmd_<millis>_<9 random chars>`.
pub fn generate_id(timestamp: i64) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("cmd_{}_{}", timestamp, &random[..9])
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
