//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default configuration file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/overlayhub.toml";

fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub extensions: ExtensionsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listening address for HTTP and WebSocket traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    33333
}

/// Connection hub behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Reject commands from peers that have not identified themselves yet.
    #[serde(default = "default_true")]
    pub require_identification: bool,

    /// Per-peer outbound message buffer; a full buffer drops new messages.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Actions refused by the security middleware.
    #[serde(default = "default_blocklist")]
    pub security_blocklist: Vec<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            require_identification: true,
            outbound_buffer: default_outbound_buffer(),
            security_blocklist: default_blocklist(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_blocklist() -> Vec<String> {
    ["eval", "script", "redirect"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Command history retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_high_water")]
    pub high_water: usize,

    #[serde(default = "default_retain")]
    pub retain: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            high_water: default_high_water(),
            retain: default_retain(),
        }
    }
}

fn default_high_water() -> usize {
    1000
}

fn default_retain() -> usize {
    500
}

/// Which analysis backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    /// OpenAI-style chat completions endpoint.
    RemoteA,
    /// Anthropic-style messages endpoint.
    RemoteB,
}

impl ProviderKind {
    pub const NAMES: [&'static str; 3] = ["mock", "remote-a", "remote-b"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "mock" => Some(Self::Mock),
            "remote-a" => Some(Self::RemoteA),
            "remote-b" => Some(Self::RemoteB),
            _ => None,
        }
    }

    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Mock)
    }
}

/// Page analysis provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Replaces the built-in analysis prompt.
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            prompt: None,
            endpoint: None,
            model: None,
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl AnalysisConfig {
    /// The configured provider; unknown names fall back to the mock.
    pub fn kind(&self) -> ProviderKind {
        ProviderKind::parse(&self.provider).unwrap_or(ProviderKind::Mock)
    }
}

fn default_provider() -> String {
    "mock".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Extension key-value storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `file`.
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

impl StorageConfig {
    pub fn is_file(&self) -> bool {
        self.backend == "file"
    }

    /// Directory for the file backend, `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(shellexpand::tilde(path).as_ref()),
            None => data_dir().join("storage"),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

/// Which extensions load, and their configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// When non-empty, only these load.
    #[serde(default)]
    pub enabled: Vec<String>,

    #[serde(default)]
    pub disabled: Vec<String>,

    /// Per-extension config, merged over each extension's defaults.
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
}

impl ExtensionsConfig {
    pub fn is_enabled(&self, name: &str) -> bool {
        let listed = self.enabled.is_empty() || self.enabled.iter().any(|e| e == name);
        listed && !self.disabled.iter().any(|d| d == name)
    }

    pub fn config_for(&self, name: &str) -> Value {
        self.config.get(name).cloned().unwrap_or(Value::Null)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write daily-rotated log files.
    #[serde(default = "default_true")]
    pub file: bool,

    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: true,
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
            None => data_dir().join("logs"),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Per-user data directory, falling back to `./.overlayhub`.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("overlayhub"))
        .unwrap_or_else(|| PathBuf::from(".overlayhub"))
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
