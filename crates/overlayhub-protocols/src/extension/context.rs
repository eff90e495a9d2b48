//! Extension context for initialization.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use crate::storage::ExtensionStorage;

/// A command emitted by an extension, waiting to enter the hub pipeline.
#[derive(Debug, Clone)]
pub struct EmittedCommand {
    pub extension: String,
    pub command: Value,
}

/// Outbox through which extensions submit commands.
///
/// Bounded and lossy: when the hub falls behind, new commands are dropped.
#[derive(Debug, Clone)]
pub struct CommandSink {
    extension: String,
    tx: mpsc::Sender<EmittedCommand>,
}

impl CommandSink {
    pub fn new(extension: impl Into<String>, tx: mpsc::Sender<EmittedCommand>) -> Self {
        Self {
            extension: extension.into(),
            tx,
        }
    }

    /// Queue a raw command. Returns false when it was dropped.
    pub fn emit(&self, command: Value) -> bool {
        match self.tx.try_send(EmittedCommand {
            extension: self.extension.clone(),
            command,
        }) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropped command from extension {}: {}", self.extension, e);
                false
            }
        }
    }
}

/// Context passed to extensions during initialization.
#[derive(Debug, Clone)]
pub struct ExtensionContext {
    /// Configuration merged over the extension's defaults.
    pub config: Value,

    /// Key-value storage namespaced by extension name.
    pub storage: ExtensionStorage,

    /// Outbox for commands the extension wants drawn or applied.
    pub commands: CommandSink,
}

impl ExtensionContext {
    pub fn new(config: Value, storage: ExtensionStorage, commands: CommandSink) -> Self {
        Self {
            config,
            storage,
            commands,
        }
    }

    /// Get a configuration value.
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
