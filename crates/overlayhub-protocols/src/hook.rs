//! Hook protocol definitions.
//!
//! A hook is a named channel fired at a lifecycle moment. Listeners receive
//! the running value and may replace it or leave it untouched.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

use crate::error::HookError;

/// Core hook names declared by the hub at startup.
pub mod names {
    pub const PAGE_LOAD: &str = "page_load";
    pub const DOM_READY: &str = "dom_ready";
    pub const SCREENSHOT_TAKEN: &str = "screenshot_taken";
    pub const COMMAND_RECEIVED: &str = "command_received";
    pub const COMMAND_EXECUTED: &str = "command_executed";
    pub const OVERLAY_DRAW: &str = "overlay_draw";
    pub const DOM_MANIPULATION: &str = "dom_manipulation";
    pub const ANALYSIS_COMPLETE: &str = "analysis_complete";
    pub const ERROR_OCCURRED: &str = "error_occurred";

    pub const ALL: [&str; 9] = [
        PAGE_LOAD,
        DOM_READY,
        SCREENSHOT_TAKEN,
        COMMAND_RECEIVED,
        COMMAND_EXECUTED,
        OVERLAY_DRAW,
        DOM_MANIPULATION,
        ANALYSIS_COMPLETE,
        ERROR_OCCURRED,
    ];
}

/// A listener attached to a hook channel.
#[async_trait]
pub trait HookListener: Send + Sync {
    /// Handle the running value.
    ///
    /// Return `Ok(Some(v))` to replace the value, `Ok(None)` to observe only.
    async fn on_hook(&self, hook: &str, data: Value) -> Result<Option<Value>, HookError>;
}

/// Adapts an async closure into a [`HookListener`].
pub struct FnListener<F> {
    f: F,
}

impl<F> FnListener<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> HookListener for FnListener<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, HookError>> + Send,
{
    async fn on_hook(&self, _hook: &str, data: Value) -> Result<Option<Value>, HookError> {
        (self.f)(data).await
    }
}
