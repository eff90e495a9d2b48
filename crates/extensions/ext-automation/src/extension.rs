//! Automation extension.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use overlayhub_protocols::error::{ExtensionError, HookError};
use overlayhub_protocols::extension::{CommandSink, Extension, ExtensionContext, ExtensionManifest};
use overlayhub_protocols::hook::{names, HookListener};
use overlayhub_protocols::types::Version;

use crate::assistants::{form_commands, is_login_url, login_commands, Automation};

const PRIORITY: i32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutomationConfig {
    pub enabled_automations: Vec<String>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled_automations: Automation::ALL
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
        }
    }
}

impl AutomationConfig {
    /// Recognised assistants; unknown names are logged and skipped.
    pub fn enabled(&self) -> HashSet<Automation> {
        self.enabled_automations
            .iter()
            .filter_map(|name| {
                let parsed = Automation::parse(name);
                if parsed.is_none() {
                    warn!("Unknown automation: {}", name);
                }
                parsed
            })
            .collect()
    }

    fn from_value(value: &Value) -> Result<Self, ExtensionError> {
        serde_json::from_value(value.clone())
            .map_err(|e| ExtensionError::InvalidContract(format!("automation config: {}", e)))
    }
}

#[derive(Default)]
struct Shared {
    enabled: RwLock<HashSet<Automation>>,
    sink: RwLock<Option<CommandSink>>,
}

impl Shared {
    fn is_enabled(&self, automation: Automation) -> bool {
        self.enabled.read().contains(&automation)
    }

    fn emit_all(&self, commands: Vec<Value>) {
        let sink = self.sink.read().clone();
        let Some(sink) = sink else {
            debug!("Automation extension not initialized, commands dropped");
            return;
        };
        for command in commands {
            sink.emit(command);
        }
    }

    fn on_dom_ready(&self, data: &Value) {
        if !self.is_enabled(Automation::FormFiller) {
            return;
        }
        let forms = data.get("formCount").and_then(Value::as_u64).unwrap_or(0);
        if forms > 0 {
            debug!("{} forms detected", forms);
            self.emit_all(form_commands());
        }
    }

    fn on_page_load(&self, data: &Value) {
        if !self.is_enabled(Automation::LoginAssistant) {
            return;
        }
        if data.get("url").and_then(Value::as_str).is_some_and(is_login_url) {
            debug!("Login page detected");
            self.emit_all(login_commands());
        }
    }
}

struct AutomationListener {
    shared: Arc<Shared>,
}

#[async_trait]
impl HookListener for AutomationListener {
    async fn on_hook(&self, hook: &str, data: Value) -> Result<Option<Value>, HookError> {
        match hook {
            names::DOM_READY => self.shared.on_dom_ready(&data),
            names::PAGE_LOAD => self.shared.on_page_load(&data),
            _ => {}
        }
        Ok(None)
    }
}

/// Automation extension.
pub struct AutomationExtension {
    manifest: ExtensionManifest,
    shared: Arc<Shared>,
}

impl AutomationExtension {
    pub fn new() -> Self {
        Self {
            manifest: ExtensionManifest::new("automation", Version::new(1, 0, 0))
                .with_description("Login and form page assistants")
                .with_priority(PRIORITY),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn is_enabled(&self, automation: Automation) -> bool {
        self.shared.is_enabled(automation)
    }

    fn apply(&self, config: &AutomationConfig) {
        *self.shared.enabled.write() = config.enabled();
    }
}

impl Default for AutomationExtension {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for AutomationExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    fn default_config(&self) -> Value {
        json!(AutomationConfig::default())
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        let config = AutomationConfig::from_value(&ctx.config)?;
        self.apply(&config);
        *self.shared.sink.write() = Some(ctx.commands);
        info!(
            "Automation extension initialized with {:?}",
            config.enabled_automations
        );
        Ok(())
    }

    fn hooks(&self) -> Vec<(String, Arc<dyn HookListener>)> {
        let listener: Arc<dyn HookListener> = Arc::new(AutomationListener {
            shared: self.shared.clone(),
        });
        vec![
            (names::DOM_READY.to_string(), listener.clone()),
            (names::PAGE_LOAD.to_string(), listener),
        ]
    }

    fn update_config(&mut self, config: &Value) {
        match AutomationConfig::from_value(config) {
            Ok(config) => self.apply(&config),
            Err(e) => warn!("{}", e),
        }
    }

    async fn cleanup(&self) -> Result<(), ExtensionError> {
        self.shared.sink.write().take();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
