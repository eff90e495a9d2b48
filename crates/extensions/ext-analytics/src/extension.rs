//! Analytics extension.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use overlayhub_protocols::error::{ExtensionError, HookError};
use overlayhub_protocols::extension::{Extension, ExtensionContext, ExtensionManifest};
use overlayhub_protocols::hook::HookListener;
use overlayhub_protocols::storage::ExtensionStorage;
use overlayhub_protocols::types::Version;

use crate::metrics::{Counter, Metrics, METRICS_KEY};

const PRIORITY: i32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
    pub track_commands: bool,
    pub track_pages: bool,
    pub track_analyses: bool,
    pub track_errors: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            track_commands: true,
            track_pages: true,
            track_analyses: true,
            track_errors: true,
        }
    }
}

impl AnalyticsConfig {
    pub fn tracks(&self, counter: Counter) -> bool {
        match counter {
            Counter::Commands => self.track_commands,
            Counter::Pages => self.track_pages,
            Counter::Analyses => self.track_analyses,
            Counter::Errors => self.track_errors,
        }
    }

    fn from_value(value: &Value) -> Result<Self, ExtensionError> {
        serde_json::from_value(value.clone())
            .map_err(|e| ExtensionError::InvalidContract(format!("analytics config: {}", e)))
    }
}

#[derive(Default)]
struct Shared {
    config: RwLock<AnalyticsConfig>,
    metrics: Mutex<Metrics>,
    storage: RwLock<Option<ExtensionStorage>>,
    /// Held for the whole write so the last save carries the newest counts.
    save_lock: tokio::sync::Mutex<()>,
}

impl Shared {
    async fn save(&self) {
        let _guard = self.save_lock.lock().await;
        let storage = self.storage.read().clone();
        let Some(storage) = storage else {
            debug!("Analytics storage not ready, metrics kept in memory");
            return;
        };
        let metrics = *self.metrics.lock();
        storage.set(METRICS_KEY, &metrics).await;
    }

    async fn record(&self, counter: Counter) {
        if !self.config.read().tracks(counter) {
            return;
        }
        self.metrics.lock().increment(counter);
        self.save().await;
    }
}

struct AnalyticsListener {
    shared: Arc<Shared>,
}

#[async_trait]
impl HookListener for AnalyticsListener {
    async fn on_hook(&self, hook: &str, _data: Value) -> Result<Option<Value>, HookError> {
        if let Some(counter) = Counter::for_hook(hook) {
            self.shared.record(counter).await;
        }
        Ok(None)
    }
}

/// Analytics extension.
pub struct AnalyticsExtension {
    manifest: ExtensionManifest,
    shared: Arc<Shared>,
}

impl AnalyticsExtension {
    pub fn new() -> Self {
        Self {
            manifest: ExtensionManifest::new("analytics", Version::new(1, 0, 0))
                .with_description("Usage counters for commands, pages, analyses and errors")
                .with_priority(PRIORITY),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn metrics(&self) -> Metrics {
        *self.shared.metrics.lock()
    }

    pub fn config(&self) -> AnalyticsConfig {
        self.shared.config.read().clone()
    }

    /// Zero every counter and persist the result.
    pub async fn reset_metrics(&self) {
        *self.shared.metrics.lock() = Metrics::default();
        self.shared.save().await;
    }
}

impl Default for AnalyticsExtension {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for AnalyticsExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    fn default_config(&self) -> Value {
        json!(AnalyticsConfig::default())
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        *self.shared.config.write() = AnalyticsConfig::from_value(&ctx.config)?;

        if let Some(stored) = ctx.storage.get::<Metrics>(METRICS_KEY).await {
            debug!("Restored analytics metrics: {:?}", stored);
            *self.shared.metrics.lock() = stored;
        }
        *self.shared.storage.write() = Some(ctx.storage);

        info!("Analytics extension initialized");
        Ok(())
    }

    fn hooks(&self) -> Vec<(String, Arc<dyn HookListener>)> {
        let listener: Arc<dyn HookListener> = Arc::new(AnalyticsListener {
            shared: self.shared.clone(),
        });
        Counter::HOOKS
            .into_iter()
            .map(|hook| (hook.to_string(), listener.clone()))
            .collect()
    }

    fn update_config(&mut self, config: &Value) {
        match AnalyticsConfig::from_value(config) {
            Ok(config) => *self.shared.config.write() = config,
            Err(e) => warn!("{}", e),
        }
    }

    async fn cleanup(&self) -> Result<(), ExtensionError> {
        self.shared.save().await;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
