//! Usage analytics extension for OverlayHub.
//!
//! Counts executed commands, page loads, completed analyses and errors, and
//! keeps the counters in the extension's storage under `metrics` so they
//! survive restarts when the hub uses a file-backed store.

mod extension;
mod metrics;

pub use extension::{AnalyticsConfig, AnalyticsExtension};
pub use metrics::{Counter, Metrics};
