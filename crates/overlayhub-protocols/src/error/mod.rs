//! Error types for the OverlayHub protocol layer.

mod protocol;
mod command;
mod extension;
mod hook;
mod hub;
mod storage;
mod analysis;
mod schema;

pub use protocol::*;
pub use command::*;
pub use extension::*;
pub use hook::*;
pub use hub::*;
pub use storage::*;
pub use analysis::*;
pub use schema::*;
