//! Accessibility extension.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use overlayhub_protocols::error::{ExtensionError, HookError};
use overlayhub_protocols::extension::{CommandSink, Extension, ExtensionContext, ExtensionManifest};
use overlayhub_protocols::hook::{names, HookListener};
use overlayhub_protocols::types::Version;

use crate::issues::{
    badge_color, check_page, AccessibilityIssue, AccessibilityReport, IssueKind, PageCounters,
};

const PRIORITY: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilityConfig {
    /// Check every loaded page.
    pub auto_analyze: bool,
    /// Draw the problems found on the page.
    pub show_warnings: bool,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            auto_analyze: true,
            show_warnings: true,
        }
    }
}

impl AccessibilityConfig {
    fn from_value(value: &Value) -> Result<Self, ExtensionError> {
        serde_json::from_value(value.clone())
            .map_err(|e| ExtensionError::InvalidContract(format!("accessibility config: {}", e)))
    }
}

#[derive(Default)]
struct Shared {
    config: RwLock<AccessibilityConfig>,
    sink: RwLock<Option<CommandSink>>,
    /// Issues of the most recently checked page.
    last_issues: Mutex<Vec<AccessibilityIssue>>,
}

impl Shared {
    fn emit(&self, command: Value) {
        match self.sink.read().as_ref() {
            Some(sink) => {
                sink.emit(command);
            }
            None => debug!("Accessibility extension not initialized, command dropped"),
        }
    }

    fn check(&self, data: &Value) -> Vec<AccessibilityIssue> {
        let issues = check_page(&PageCounters::from_data(data));
        *self.last_issues.lock() = issues.clone();

        if !issues.is_empty() && self.config.read().show_warnings {
            for issue in &issues {
                self.outline(issue);
            }
        }
        issues
    }

    fn outline(&self, issue: &AccessibilityIssue) {
        match issue.kind {
            IssueKind::MissingAlt => self.emit(json!({
                "action": "highlight",
                "selector": "img:not([alt])",
                "style": {
                    "outline": "3px solid #ff5722",
                    "boxShadow": "0 0 10px rgba(255, 87, 34, 0.5)",
                },
            })),
            IssueKind::LowContrast => self.emit(json!({
                "action": "text",
                "text": "Low contrast",
                "position": [10, 10],
                "color": "#ff5722",
                "backgroundColor": "rgba(255, 87, 34, 0.9)",
            })),
            IssueKind::NoHeadings => {}
        }
    }

    fn on_page_load(&self, mut data: Value) -> Option<Value> {
        if !self.config.read().auto_analyze {
            return None;
        }
        let issues = self.check(&data);
        info!("Accessibility check found {} issues", issues.len());

        let fields = data.as_object_mut()?;
        fields.insert("accessibilityIssues".into(), json!(issues));
        Some(data)
    }

    fn on_analysis_complete(&self, mut data: Value) -> Option<Value> {
        let issues = match data.get("accessibilityIssues") {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!("Ignoring malformed accessibilityIssues: {}", e);
                Vec::new()
            }),
            None => self.last_issues.lock().clone(),
        };
        let report = AccessibilityReport::from_issues(issues);

        self.emit(json!({
            "action": "text",
            "text": format!("Accessibility: {}/10", report.score),
            "position": [10, 50],
            "color": badge_color(report.score),
            "backgroundColor": "rgba(0, 0, 0, 0.8)",
            "fontSize": 14,
        }));

        let fields = data.as_object_mut()?;
        fields.insert("accessibilityReport".into(), json!(report));
        Some(data)
    }
}

struct AccessibilityListener {
    shared: Arc<Shared>,
}

#[async_trait]
impl HookListener for AccessibilityListener {
    async fn on_hook(&self, hook: &str, data: Value) -> Result<Option<Value>, HookError> {
        Ok(match hook {
            names::PAGE_LOAD => self.shared.on_page_load(data),
            names::DOM_READY => {
                self.shared.check(&data);
                None
            }
            names::ANALYSIS_COMPLETE => self.shared.on_analysis_complete(data),
            _ => None,
        })
    }
}

/// Accessibility extension.
pub struct AccessibilityExtension {
    manifest: ExtensionManifest,
    shared: Arc<Shared>,
}

impl AccessibilityExtension {
    pub fn new() -> Self {
        Self {
            manifest: ExtensionManifest::new("accessibility", Version::new(1, 0, 0))
                .with_description("Accessibility checks and page reports")
                .with_priority(PRIORITY),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn config(&self) -> AccessibilityConfig {
        self.shared.config.read().clone()
    }

    /// Issues found on the last checked page.
    pub fn last_issues(&self) -> Vec<AccessibilityIssue> {
        self.shared.last_issues.lock().clone()
    }
}

impl Default for AccessibilityExtension {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for AccessibilityExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    fn default_config(&self) -> Value {
        json!(AccessibilityConfig::default())
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        *self.shared.config.write() = AccessibilityConfig::from_value(&ctx.config)?;
        *self.shared.sink.write() = Some(ctx.commands);
        info!("Accessibility extension initialized");
        Ok(())
    }

    fn hooks(&self) -> Vec<(String, Arc<dyn HookListener>)> {
        let listener: Arc<dyn HookListener> = Arc::new(AccessibilityListener {
            shared: self.shared.clone(),
        });
        [names::PAGE_LOAD, names::DOM_READY, names::ANALYSIS_COMPLETE]
            .into_iter()
            .map(|hook| (hook.to_string(), listener.clone()))
            .collect()
    }

    fn update_config(&mut self, config: &Value) {
        match AccessibilityConfig::from_value(config) {
            Ok(config) => *self.shared.config.write() = config,
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
