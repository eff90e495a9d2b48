//! Extension registration.

use std::sync::Arc;

use tracing::{error, info};

use overlayhub_config::Config;
use overlayhub_core::{ExtensionHost, FileStore, MemoryStore};
use overlayhub_ext_accessibility::AccessibilityExtension;
use overlayhub_ext_analytics::AnalyticsExtension;
use overlayhub_ext_automation::AutomationExtension;
use overlayhub_protocols::extension::Extension;
use overlayhub_protocols::storage::KeyValueStore;

/// Every extension shipped with the hub.
pub(crate) fn builtin_extensions() -> Vec<Box<dyn Extension>> {
    vec![
        Box::new(AccessibilityExtension::new()),
        Box::new(AnalyticsExtension::new()),
        Box::new(AutomationExtension::new()),
    ]
}

/// Storage backend selected by `storage.backend`.
pub(crate) fn build_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if config.storage.is_file() {
        let dir = config.storage.resolved_path();
        info!("Extension storage: {}", dir.display());
        Arc::new(FileStore::new(dir))
    } else {
        info!("Extension storage: in memory");
        Arc::new(MemoryStore::new())
    }
}

/// Load the enabled builtin extensions. Returns how many loaded.
///
/// A failing extension is logged and skipped; the hub runs without it.
pub(crate) async fn load_extensions(host: &ExtensionHost, config: &Config) -> usize {
    let mut loaded = 0;
    for extension in builtin_extensions() {
        let name = extension.manifest().name.clone();
        if !config.extensions.is_enabled(&name) {
            info!("Extension disabled by config: {}", name);
            continue;
        }
        match host.load(extension, config.extensions.config_for(&name)).await {
            Ok(()) => loaded += 1,
            Err(e) => error!("Failed to load extension {}: {}", name, e),
        }
    }
    loaded
}
