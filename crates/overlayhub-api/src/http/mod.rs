//! HTTP interface.
//!
//! REST endpoints for submitting commands, inspecting the hub and
//! requesting analyses, plus the `/ws` upgrade.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
