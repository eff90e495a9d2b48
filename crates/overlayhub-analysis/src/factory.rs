//! Build the configured analysis provider.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use overlayhub_config::{AnalysisConfig, ProviderKind};
use overlayhub_protocols::analysis::AnalysisProvider;

use crate::mock::MockProvider;
use crate::remote::{ChatCompletionsProvider, MessagesProvider, RemoteSettings};

/// The provider `config` asks for, or the mock when it is unusable.
pub fn build_provider(config: &AnalysisConfig) -> Arc<dyn AnalysisProvider> {
    let Some(kind) = ProviderKind::parse(&config.provider) else {
        warn!("Unknown analysis provider '{}', using mock", config.provider);
        return Arc::new(MockProvider::new());
    };

    if kind == ProviderKind::Mock {
        info!("Using mock analysis provider");
        return Arc::new(MockProvider::new());
    }

    let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.is_empty()) else {
        warn!(
            "Analysis provider '{}' has no endpoint, using mock",
            config.provider
        );
        return Arc::new(MockProvider::new());
    };

    let timeout = Duration::from_secs(config.timeout_seconds.max(1));
    let mut settings = RemoteSettings::new(endpoint).with_timeout(timeout);
    settings.api_key = config.api_key.clone();
    settings.model = config.model.clone();
    settings.prompt = config.prompt.clone();

    info!("Using analysis provider '{}' at {}", config.provider, endpoint);
    match kind {
        ProviderKind::RemoteA => Arc::new(ChatCompletionsProvider::new(settings)),
        ProviderKind::RemoteB => Arc::new(MessagesProvider::new(settings)),
        ProviderKind::Mock => Arc::new(MockProvider::new()),
    }
}
