//! Extension trait definition.

use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use super::{ExtensionContext, ExtensionManifest};
use crate::error::ExtensionError;
use crate::hook::HookListener;
use crate::schema::CommandSchema;

/// Core trait for all extensions.
///
/// An extension declares hook listeners and command schemas. The host wires
/// them after [`Extension::initialize`] succeeds and unwires them on unload.
#[async_trait]
pub trait Extension: Send + Sync + 'static {
    /// Returns the extension manifest.
    fn manifest(&self) -> &ExtensionManifest;

    /// Default configuration; user config is merged over it key by key.
    fn default_config(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }

    /// Initialize the extension with the given context.
    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError>;

    /// Hook listeners to wire, as `(hook name, listener)` pairs.
    fn hooks(&self) -> Vec<(String, Arc<dyn HookListener>)> {
        Vec::new()
    }

    /// Command schemas to register, as `(action, schema)` pairs.
    fn commands(&self) -> Vec<(String, CommandSchema)> {
        Vec::new()
    }

    /// Apply a configuration change while loaded.
    fn update_config(&mut self, _config: &Value) {}

    /// Release resources before unload.
    async fn cleanup(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Returns a reference to the extension as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
