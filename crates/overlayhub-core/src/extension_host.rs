//! Extension host: load, wire, configure and unload extensions.

use serde_json::{Map, Value};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use overlayhub_protocols::error::ExtensionError;
use overlayhub_protocols::extension::{
    CommandSink, EmittedCommand, Extension, ExtensionContext, ExtensionManifest,
};
use overlayhub_protocols::hook::HookListener;
use overlayhub_protocols::schema::CommandSchema;
use overlayhub_protocols::storage::{ExtensionStorage, KeyValueStore};

use crate::hooks::HookDispatcher;
use crate::schema::SchemaRegistry;

/// Default capacity of the extension command outbox.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// A command an extension registered, and what it displaced.
struct WiredCommand {
    action: String,
    replaced: Option<Arc<CommandSchema>>,
}

/// Everything the host wired on behalf of one extension.
#[derive(Default)]
struct Wiring {
    listeners: Vec<(String, Arc<dyn HookListener>)>,
    commands: Vec<WiredCommand>,
}

struct LoadedExtension {
    extension: Box<dyn Extension>,
    config: Value,
    wiring: Wiring,
}

/// Owns loaded extensions and their hook and schema registrations.
pub struct ExtensionHost {
    hooks: Arc<HookDispatcher>,
    schemas: Arc<SchemaRegistry>,
    store: Arc<dyn KeyValueStore>,
    /// Load order is kept; unload-all walks it in reverse.
    loaded: RwLock<Vec<LoadedExtension>>,
    outbox_tx: mpsc::Sender<EmittedCommand>,
    outbox_rx: parking_lot::Mutex<Option<mpsc::Receiver<EmittedCommand>>>,
}

impl ExtensionHost {
    pub fn new(
        hooks: Arc<HookDispatcher>,
        schemas: Arc<SchemaRegistry>,
        store: Arc<dyn KeyValueStore>,
        outbox_capacity: usize,
    ) -> Self {
        let (outbox_tx, outbox_rx) = mpsc::channel(outbox_capacity.max(1));
        Self {
            hooks,
            schemas,
            store,
            loaded: RwLock::new(Vec::new()),
            outbox_tx,
            outbox_rx: parking_lot::Mutex::new(Some(outbox_rx)),
        }
    }

    /// Receiver for commands emitted by extensions. Can be taken once.
    pub fn take_outbox(&self) -> Option<mpsc::Receiver<EmittedCommand>> {
        self.outbox_rx.lock().take()
    }

    /// Load, initialize and wire an extension.
    ///
    /// On any failure nothing stays registered: hooks already attached are
    /// detached and displaced schemas are put back.
    pub async fn load(
        &self,
        mut extension: Box<dyn Extension>,
        config: Value,
    ) -> Result<(), ExtensionError> {
        let manifest = extension.manifest().clone();
        validate_manifest(&manifest)?;

        let mut loaded = self.loaded.write().await;
        if loaded.iter().any(|l| l.extension.manifest().name == manifest.name) {
            return Err(ExtensionError::AlreadyRegistered(manifest.name));
        }

        info!("Loading extension: {} v{}", manifest.name, manifest.version);

        let config = merge_config(&manifest.name, extension.default_config(), config)?;
        let ctx = ExtensionContext::new(
            config.clone(),
            ExtensionStorage::new(manifest.name.clone(), self.store.clone()),
            CommandSink::new(manifest.name.clone(), self.outbox_tx.clone()),
        );

        extension.initialize(ctx).await.map_err(|e| match e {
            ExtensionError::InitializationFailed(_) => e,
            other => ExtensionError::InitializationFailed(format!("{}: {}", manifest.name, other)),
        })?;

        let wiring = match self.wire(&manifest, extension.as_ref()) {
            Ok(wiring) => wiring,
            Err(e) => {
                if let Err(cleanup) = extension.cleanup().await {
                    warn!("Cleanup after failed load of {}: {}", manifest.name, cleanup);
                }
                return Err(e);
            }
        };

        info!(
            "Extension loaded: {} ({} listeners, {} commands)",
            manifest.name,
            wiring.listeners.len(),
            wiring.commands.len()
        );
        loaded.push(LoadedExtension {
            extension,
            config,
            wiring,
        });
        Ok(())
    }

    fn wire(
        &self,
        manifest: &ExtensionManifest,
        extension: &dyn Extension,
    ) -> Result<Wiring, ExtensionError> {
        let mut wiring = Wiring::default();

        for (hook, listener) in extension.hooks() {
            if hook.is_empty() {
                self.unwire(&mut wiring);
                return Err(ExtensionError::Wiring {
                    extension: manifest.name.clone(),
                    reason: "listener declared for an empty hook name".to_string(),
                });
            }
            self.hooks.add_listener(&hook, listener.clone(), manifest.priority);
            wiring.listeners.push((hook, listener));
        }

        for (action, schema) in extension.commands() {
            match self.schemas.register_schema(action.clone(), schema) {
                Ok(replaced) => {
                    if replaced.is_some() {
                        warn!("Extension {} replaced command schema {}", manifest.name, action);
                    }
                    wiring.commands.push(WiredCommand { action, replaced });
                }
                Err(e) => {
                    self.unwire(&mut wiring);
                    return Err(ExtensionError::Wiring {
                        extension: manifest.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(wiring)
    }

    /// Undo a wiring in reverse order.
    fn unwire(&self, wiring: &mut Wiring) {
        while let Some(command) = wiring.commands.pop() {
            match command.replaced {
                Some(previous) => self.schemas.restore_schema(command.action, previous),
                None => {
                    self.schemas.unregister_schema(&command.action);
                }
            }
        }
        while let Some((hook, listener)) = wiring.listeners.pop() {
            self.hooks.remove_listener(&hook, &listener);
        }
    }

    /// Clean up and unwire an extension.
    ///
    /// A failing cleanup is logged; the extension is unwired regardless.
    pub async fn unload(&self, name: &str) -> Result<(), ExtensionError> {
        let mut loaded = self.loaded.write().await;
        let index = loaded
            .iter()
            .position(|l| l.extension.manifest().name == name)
            .ok_or_else(|| ExtensionError::NotFound(name.to_string()))?;
        let mut entry = loaded.remove(index);
        drop(loaded);

        info!("Unloading extension: {}", name);
        if let Err(e) = entry.extension.cleanup().await {
            warn!("Extension {} cleanup failed: {}", name, e);
        }
        self.unwire(&mut entry.wiring);
        Ok(())
    }

    /// Unload everything, most recently loaded first.
    pub async fn unload_all(&self) {
        let names: Vec<String> = self
            .loaded
            .read()
            .await
            .iter()
            .rev()
            .map(|l| l.extension.manifest().name.clone())
            .collect();
        for name in names {
            if let Err(e) = self.unload(&name).await {
                warn!("Failed to unload {}: {}", name, e);
            }
        }
    }

    /// Replace a loaded extension's configuration.
    ///
    /// The new config is merged over the extension's defaults and handed to
    /// the extension. Returns the effective config.
    pub async fn set_config(&self, name: &str, config: Value) -> Result<Value, ExtensionError> {
        let mut loaded = self.loaded.write().await;
        let entry = loaded
            .iter_mut()
            .find(|l| l.extension.manifest().name == name)
            .ok_or_else(|| ExtensionError::NotFound(name.to_string()))?;

        let merged = merge_config(name, entry.extension.default_config(), config)?;
        entry.extension.update_config(&merged);
        entry.config = merged.clone();
        info!("Updated config for extension: {}", name);
        Ok(merged)
    }

    pub async fn config(&self, name: &str) -> Option<Value> {
        self.loaded
            .read()
            .await
            .iter()
            .find(|l| l.extension.manifest().name == name)
            .map(|l| l.config.clone())
    }

    pub async fn is_loaded(&self, name: &str) -> bool {
        self.loaded
            .read()
            .await
            .iter()
            .any(|l| l.extension.manifest().name == name)
    }

    /// Manifests of loaded extensions, in load order.
    pub async fn list(&self) -> Vec<ExtensionManifest> {
        self.loaded
            .read()
            .await
            .iter()
            .map(|l| l.extension.manifest().clone())
            .collect()
    }

    /// Run `f` against a loaded extension of concrete type `T`.
    pub async fn with_extension<T, R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: Any,
    {
        let loaded = self.loaded.read().await;
        let entry = loaded.iter().find(|l| l.extension.manifest().name == name)?;
        entry.extension.as_any().downcast_ref::<T>().map(f)
    }

    /// Storage handle for a namespace, as an extension would see it.
    pub fn storage(&self, name: &str) -> ExtensionStorage {
        ExtensionStorage::new(name, self.store.clone())
    }
}

fn validate_manifest(manifest: &ExtensionManifest) -> Result<(), ExtensionError> {
    if manifest.name.is_empty() {
        return Err(ExtensionError::InvalidContract(
            "extension name must not be empty".to_string(),
        ));
    }
    let valid = manifest
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ExtensionError::InvalidContract(format!(
            "extension name {:?} may only contain letters, digits, '-' and '_'",
            manifest.name
        )));
    }
    Ok(())
}

/// Shallow merge: top-level keys of `config` override `defaults`.
fn merge_config(name: &str, defaults: Value, config: Value) -> Result<Value, ExtensionError> {
    let mut merged = match defaults {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(ExtensionError::InvalidContract(format!(
                "{}: default config must be an object",
                name
            )));
        }
    };
    match config {
        Value::Object(overrides) => merged.extend(overrides),
        Value::Null => {}
        _ => {
            return Err(ExtensionError::InvalidContract(format!(
                "{}: config must be an object",
                name
            )));
        }
    }
    Ok(Value::Object(merged))
}

#[cfg(test)]
#[path = "extension_host_tests.rs"]
mod tests;
