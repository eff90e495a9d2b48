//! # OverlayHub API
//!
//! The network face of the hub: every browser window, control panel, agent
//! and drawing surface connects here over one WebSocket endpoint, and the
//! same port serves a small REST API.
//!
//! ```text
//!   peers ──ws──▶ inbound::dispatch ──▶ pipeline::submit_command ──▶ ConnectionHub::route ──▶ peers
//!   HTTP  ──────────────────────────────▲
//!   extension outbox ───────────────────┘
//! ```
//!
//! Typed messages (identification, screenshots, DOM snapshots, voice) are
//! handled by [`inbound::MessageHandler`]s; commands from any source go
//! through the same processor, routing and hooks.

pub mod error;
pub mod http;
pub mod hub;
pub mod inbound;
pub mod outbox;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod websocket;

pub use error::ApiError;
pub use http::create_router;
pub use hub::{ConnectionHub, Delivery};
pub use inbound::{MessageHandler, MessageHandlers};
pub use outbox::spawn_outbox;
pub use pipeline::{submit_command, Accepted};
pub use server::{HubServer, InterfaceConfig};
pub use state::{AppState, HubSettings};
