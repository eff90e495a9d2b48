//! Hook dispatcher.
//!
//! Named channels with priority-ordered listeners. Dispatch threads a JSON
//! value through the listeners one at a time; a failing or panicking
//! listener is logged and skipped, the chain always completes.

use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};

use overlayhub_protocols::error::HookError;
use overlayhub_protocols::hook::HookListener;

pub use overlayhub_protocols::extension::DEFAULT_PRIORITY;

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;

/// Listeners of one channel keyed by `(priority, registration sequence)`,
/// so iteration order is priority ascending with ties in insertion order.
type Channel = BTreeMap<(i32, u64), Arc<dyn HookListener>>;

/// A listener failure recorded during dispatch.
#[derive(Debug)]
pub struct ListenerFailure {
    pub hook: String,
    pub priority: i32,
    pub error: HookError,
}

/// Result of a dispatch: the final value plus any isolated failures.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub data: Value,
    pub failures: Vec<ListenerFailure>,
}

/// Registry of hook channels.
pub struct HookDispatcher {
    channels: RwLock<HashMap<String, Channel>>,
    sequence: AtomicU64,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Declare a channel. No-op if it exists.
    pub fn register(&self, hook: &str) {
        self.channels
            .write()
            .entry(hook.to_string())
            .or_default();
    }

    pub fn is_registered(&self, hook: &str) -> bool {
        self.channels.read().contains_key(hook)
    }

    /// Sorted channel names.
    pub fn hooks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn listener_count(&self, hook: &str) -> usize {
        self.channels.read().get(hook).map_or(0, BTreeMap::len)
    }

    /// Attach a listener, declaring the channel if needed. Lower priority
    /// runs first; equal priorities run in registration order.
    pub fn add_listener(&self, hook: &str, listener: Arc<dyn HookListener>, priority: i32) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        debug!("Adding listener to hook {} at priority {}", hook, priority);
        self.channels
            .write()
            .entry(hook.to_string())
            .or_default()
            .insert((priority, seq), listener);
    }

    /// Detach a listener by identity. Returns whether it was attached.
    pub fn remove_listener(&self, hook: &str, listener: &Arc<dyn HookListener>) -> bool {
        let mut channels = self.channels.write();
        let Some(channel) = channels.get_mut(hook) else {
            return false;
        };
        let key = channel
            .iter()
            .find(|(_, candidate)| {
                std::ptr::addr_eq(Arc::as_ptr(*candidate), Arc::as_ptr(listener))
            })
            .map(|(key, _)| *key);
        match key {
            Some(key) => {
                channel.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Thread `data` through the channel's listeners in order.
    ///
    /// The listener set is snapshotted first, so listeners added or removed
    /// during dispatch take effect on the next call.
    pub async fn dispatch(&self, hook: &str, data: Value) -> DispatchOutcome {
        let listeners: Vec<(i32, Arc<dyn HookListener>)> = match self.channels.read().get(hook) {
            Some(channel) => channel
                .iter()
                .map(|((priority, _), listener)| (*priority, listener.clone()))
                .collect(),
            None => Vec::new(),
        };

        let mut data = data;
        let mut failures = Vec::new();

        for (priority, listener) in listeners {
            let result = AssertUnwindSafe(listener.on_hook(hook, data.clone()))
                .catch_unwind()
                .await;

            let failure = match result {
                Ok(Ok(Some(next))) => {
                    data = next;
                    None
                }
                Ok(Ok(None)) => None,
                Ok(Err(e)) => Some(e),
                Err(panic) => Some(HookError::ListenerPanicked(panic_message(&*panic))),
            };

            if let Some(error) = failure {
                error!("Hook {} listener (priority {}) failed: {}", hook, priority, error);
                failures.push(ListenerFailure {
                    hook: hook.to_string(),
                    priority,
                    error,
                });
            }
        }

        DispatchOutcome { data, failures }
    }

    /// Dispatch and keep only the final value.
    pub async fn fire(&self, hook: &str, data: Value) -> Value {
        self.dispatch(hook, data).await.data
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
