//! Feeds commands emitted by extensions into the command pipeline.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use overlayhub_protocols::command::CommandContext;

use crate::pipeline::submit_command;
use crate::state::AppState;

/// Start draining the extension outbox.
///
/// Returns `None` when the outbox was already taken.
pub fn spawn_outbox(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let mut rx = state.extensions.take_outbox()?;
    Some(tokio::spawn(async move {
        while let Some(emitted) = rx.recv().await {
            let context = CommandContext::new(format!("extension:{}", emitted.extension));
            match submit_command(&state, emitted.command, &context).await {
                Ok(accepted) => debug!(
                    "Extension {} command {} accepted",
                    emitted.extension, accepted.command.id
                ),
                Err(e) => warn!("Extension {} command rejected: {}", emitted.extension, e),
            }
        }
        debug!("Extension outbox closed");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use overlayhub_protocols::error::ExtensionError;
    use overlayhub_protocols::extension::{Extension, ExtensionContext, ExtensionManifest};
    use overlayhub_protocols::peer::PeerRole;
    use overlayhub_protocols::types::Version;
    use serde_json::{json, Value};
    use std::any::Any;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Greeter {
        manifest: ExtensionManifest,
    }

    #[async_trait]
    impl Extension for Greeter {
        fn manifest(&self) -> &ExtensionManifest {
            &self.manifest
        }

        async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
            ctx.commands
                .emit(json!({"action": "text", "text": "hello", "position": [10, 10]}));
            ctx.commands.emit(json!({"action": "circle", "radius": -1}));
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[tokio::test]
    async fn test_outbox_feeds_pipeline() {
        let state = Arc::new(AppState::default());
        let (tx, mut rx) = mpsc::channel(8);
        state.hub.register("overlay", tx);
        state.hub.classify("overlay", PeerRole::Overlay);

        let handle = spawn_outbox(state.clone()).unwrap();
        assert!(spawn_outbox(state.clone()).is_none());

        state
            .extensions
            .load(
                Box::new(Greeter {
                    manifest: ExtensionManifest::new("greeter", Version::new(0, 1, 0)),
                }),
                Value::Null,
            )
            .await
            .unwrap();

        let text = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let drawn: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(drawn["text"], "hello");

        let entry = &state.processor.history().recent(1)[0];
        assert_eq!(entry.context.source, "extension:greeter");
        handle.abort();
    }
}
