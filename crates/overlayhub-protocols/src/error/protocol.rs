//! Top-level protocol error type.

use thiserror::Error;

use super::{
    AnalysisError, CommandError, ExtensionError, HookError, HubError, SchemaError, StorageError,
};

/// Top-level protocol error type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Hub error: {0}")]
    Hub(#[from] HubError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
