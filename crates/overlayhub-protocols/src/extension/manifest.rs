//! Extension manifest types.

use serde::{Deserialize, Serialize};

use crate::types::Version;

/// Listener priority used when an extension does not declare one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Extension manifest containing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub description: String,
    /// Priority at which the extension's hook listeners run; lower runs first.
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl ExtensionManifest {
    /// Create a new extension manifest.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            description: String::new(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
