//! # OverlayHub Core
//!
//! The in-process engine of the hub.
//!
//! ## Components
//!
//! - [`SchemaRegistry`] - Command schemas, named validators and defaults
//! - [`CommandProcessor`] - Validation, middleware, stamping and history
//! - [`HookDispatcher`] - Priority-ordered hook channels
//! - [`ExtensionHost`] - Extension lifecycle and wiring
//! - [`MemoryStore`] / [`FileStore`] - Key-value backends for extension storage
//!
//! Every registry is a plain instance; construct as many independent hubs
//! as you like.

pub mod extension_host;
pub mod hooks;
pub mod processor;
pub mod schema;
pub mod storage;

pub use extension_host::{ExtensionHost, DEFAULT_OUTBOX_CAPACITY};
pub use hooks::{DispatchOutcome, HookDispatcher, ListenerFailure};
pub use processor::{
    CommandHistory, CommandProcessor, LoggingMiddleware, Middleware, SecurityMiddleware,
};
pub use schema::{SchemaRegistry, Validator};
pub use storage::{FileStore, MemoryStore};
