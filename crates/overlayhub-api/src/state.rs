//! Application state.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use overlayhub_analysis::{build_provider, MockProvider};
use overlayhub_config::Config;
use overlayhub_core::{
    CommandHistory, CommandProcessor, ExtensionHost, HookDispatcher, LoggingMiddleware,
    MemoryStore, SchemaRegistry, SecurityMiddleware, DEFAULT_OUTBOX_CAPACITY,
};
use overlayhub_protocols::analysis::{AnalysisProvider, PageAnalysis};
use overlayhub_protocols::hook::names;
use overlayhub_protocols::storage::KeyValueStore;

use crate::hub::{ConnectionHub, DEFAULT_OUTBOUND_BUFFER};
use crate::inbound::MessageHandlers;

/// Page URLs whose screenshot analysis is kept.
pub const ANALYSIS_CACHE_CAPACITY: usize = 32;

/// Hub behaviour switches.
#[derive(Debug, Clone)]
pub struct HubSettings {
    /// Commands from unidentified peers are refused.
    pub require_identification: bool,
    /// Prompt handed to the analysis provider; `None` uses its default.
    pub analysis_prompt: Option<String>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            require_identification: true,
            analysis_prompt: None,
        }
    }
}

/// Application state shared across the WebSocket and HTTP handlers.
pub struct AppState {
    pub hub: Arc<ConnectionHub>,
    pub processor: Arc<CommandProcessor>,
    pub hooks: Arc<HookDispatcher>,
    pub extensions: Arc<ExtensionHost>,
    pub provider: Arc<dyn AnalysisProvider>,
    pub handlers: MessageHandlers,
    pub settings: HubSettings,
    /// Screenshot analyses by page URL, newest first. Dropped on navigation.
    analysis_cache: Mutex<VecDeque<(String, PageAnalysis)>>,
    start_time: Instant,
}

impl AppState {
    pub fn new(
        hub: Arc<ConnectionHub>,
        processor: Arc<CommandProcessor>,
        hooks: Arc<HookDispatcher>,
        extensions: Arc<ExtensionHost>,
        provider: Arc<dyn AnalysisProvider>,
        settings: HubSettings,
    ) -> Self {
        for hook in names::ALL {
            hooks.register(hook);
        }
        Self {
            hub,
            processor,
            hooks,
            extensions,
            provider,
            handlers: MessageHandlers::with_builtin(),
            settings,
            analysis_cache: Mutex::new(VecDeque::new()),
            start_time: Instant::now(),
        }
    }

    /// Wire the full stack from configuration. Extensions are not loaded.
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let schemas = Arc::new(SchemaRegistry::with_builtin_catalog());
        let processor = Arc::new(CommandProcessor::with_history(
            schemas.clone(),
            CommandHistory::new(config.history.high_water, config.history.retain),
        ));
        processor.add_middleware(Arc::new(SecurityMiddleware::new(
            config.hub.security_blocklist.iter().cloned(),
        )));
        processor.add_middleware(Arc::new(LoggingMiddleware));

        let hooks = Arc::new(HookDispatcher::new());
        let extensions = Arc::new(ExtensionHost::new(
            hooks.clone(),
            schemas,
            store,
            DEFAULT_OUTBOX_CAPACITY,
        ));

        Self::new(
            Arc::new(ConnectionHub::new(config.hub.outbound_buffer)),
            processor,
            hooks,
            extensions,
            build_provider(&config.analysis),
            HubSettings {
                require_identification: config.hub.require_identification,
                analysis_prompt: config.analysis.prompt.clone(),
            },
        )
    }

    /// Get uptime.
    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    pub fn cached_analysis(&self, url: &str) -> Option<PageAnalysis> {
        self.analysis_cache
            .lock()
            .iter()
            .find(|(cached, _)| cached == url)
            .map(|(_, analysis)| analysis.clone())
    }

    /// Remember an analysis; the least recently stored URL goes once the
    /// cache holds [`ANALYSIS_CACHE_CAPACITY`] pages.
    pub fn cache_analysis(&self, url: impl Into<String>, analysis: PageAnalysis) {
        let url = url.into();
        let mut cache = self.analysis_cache.lock();
        cache.retain(|(cached, _)| *cached != url);
        cache.push_front((url, analysis));
        cache.truncate(ANALYSIS_CACHE_CAPACITY);
    }

    pub fn cached_pages(&self) -> usize {
        self.analysis_cache.lock().len()
    }

    pub fn clear_analysis_cache(&self) {
        self.analysis_cache.lock().clear();
    }

    pub fn prompt(&self) -> Option<&str> {
        self.settings.analysis_prompt.as_deref()
    }
}

impl Default for AppState {
    /// In-memory stack with the builtin catalog and the mock provider.
    fn default() -> Self {
        let schemas = Arc::new(SchemaRegistry::with_builtin_catalog());
        let processor = Arc::new(CommandProcessor::new(schemas.clone()));
        processor.add_middleware(Arc::new(SecurityMiddleware::default()));

        let hooks = Arc::new(HookDispatcher::new());
        let extensions = Arc::new(ExtensionHost::new(
            hooks.clone(),
            schemas,
            Arc::new(MemoryStore::new()),
            DEFAULT_OUTBOX_CAPACITY,
        ));

        Self::new(
            Arc::new(ConnectionHub::new(DEFAULT_OUTBOUND_BUFFER)),
            processor,
            hooks,
            extensions,
            Arc::new(MockProvider::new()),
            HubSettings::default(),
        )
    }
}
