//! # OverlayHub Protocols
//!
//! Core protocol definitions (types and traits) for OverlayHub.
//! Contains only interface definitions and plain data - no registries,
//! no transports.
//!
//! ## Core Traits
//!
//! - [`Extension`] - Base trait for all extensions
//! - [`HookListener`] - Listener attached to a named hook channel
//! - [`KeyValueStore`] - Backend for namespaced extension storage
//! - [`AnalysisProvider`] - Source of page analyses

pub mod analysis;
pub mod command;
pub mod error;
pub mod extension;
pub mod hook;
pub mod peer;
pub mod schema;
pub mod storage;
pub mod types;

// Re-export core traits
pub use analysis::{AnalysisProvider, PageAnalysis};
pub use command::{Command, CommandBody, CommandContext, HistoryEntry, Surface, ValidationResult};
pub use error::{
    AnalysisError, CommandError, ExtensionError, HookError, HubError, ProtocolError, SchemaError,
    StorageError,
};
pub use extension::{CommandSink, EmittedCommand, Extension, ExtensionContext, ExtensionManifest};
pub use hook::{FnListener, HookListener};
pub use peer::{PeerInfo, PeerRole, RoleFilter};
pub use schema::{CommandSchema, ParamFormat, ParamSpec, ParamType};
pub use storage::{ExtensionStorage, KeyValueStore};
pub use types::*;
