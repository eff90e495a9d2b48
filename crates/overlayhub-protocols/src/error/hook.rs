//! Hook listener errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Listener failed: {0}")]
    ListenerFailed(String),

    #[error("Listener panicked: {0}")]
    ListenerPanicked(String),
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ListenerFailed(message.into())
    }
}
